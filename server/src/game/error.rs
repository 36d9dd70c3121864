//! Why an intent was refused. Every variant leaves the game untouched.

use crate::game::geometry::Pos;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "code")]
pub enum RuleError {
    #[error("not enough energy: need {needed}, have {available}")]
    InsufficientEnergy { needed: u32, available: u32 },

    #[error("cannot place a base on occupied cell {pos}")]
    IllegalPlacement { pos: Pos },

    #[error("cell {pos} is occupied")]
    CellOccupied { pos: Pos },

    #[error("base already placed")]
    BaseAlreadyPlaced,

    #[error("place your base first")]
    BaseNotYetPlaced,

    #[error("{pos} is not next to your base")]
    OutOfDeploymentZone { pos: Pos },

    #[error("no piece of yours that can do that at {pos}")]
    NotYourPiece { pos: Pos },

    #[error("cannot move to {pos}")]
    InvalidDestination { pos: Pos },

    #[error("target {pos} is out of range")]
    OutOfRange { pos: Pos },

    #[error("target {pos} is one of your own pieces")]
    TargetIsAlly { pos: Pos },

    #[error("the piece at {pos} has no special ability")]
    NoSpecialAbility { pos: Pos },

    #[error("special ability already used")]
    SpecialAlreadyUsed,

    #[error("no eligible target")]
    NoEligibleTarget,

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("not your turn")]
    NotYourTurn,

    #[error("game is over")]
    GameOver,

    #[error("{pos} is off the board")]
    OutOfBounds { pos: Pos },

    #[error("bases cannot be deployed as units")]
    BaseIsNotAUnit,
}
