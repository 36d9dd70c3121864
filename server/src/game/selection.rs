//! Two-click move/attack flow: pick one of your pieces, then pick a cell.

use crate::game::{
    error::RuleError,
    geometry::Pos,
    logic::{GameState, Intent},
    types::{Piece, PlayerId},
};
use serde::{Deserialize, Serialize};

/// What the second click should do with the selected piece.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Move,
    Attack,
}

/// Cells worth highlighting for a selected piece.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Highlights {
    pub movable: Vec<Pos>,
    pub attackable: Vec<Pos>,
}

impl Highlights {
    pub fn for_cell(game: &GameState, pos: Pos) -> Self {
        Highlights {
            movable: game.move_targets(pos),
            attackable: game.attack_targets(pos),
        }
    }
}

/// The source of a pending move or attack. Never part of [`GameState`];
/// it lives only until the next action resolves or is cancelled.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PendingSelection {
    pub position: Pos,
    pub piece: Piece,
}

impl PendingSelection {
    /// Selects `player`'s piece at `pos`.
    pub fn select(game: &GameState, player: PlayerId, pos: Pos) -> Result<Self, RuleError> {
        if game.winner().is_some() {
            return Err(RuleError::GameOver);
        }
        match game.piece_at(pos) {
            Some(pc) if pc.owner == player => Ok(PendingSelection {
                position: pos,
                piece: *pc,
            }),
            _ => Err(RuleError::NotYourPiece { pos }),
        }
    }

    /// Turns the selection plus a second click into an intent.
    pub fn resolve(self, mode: SelectionMode, target: Pos) -> Intent {
        match mode {
            SelectionMode::Move => Intent::Move {
                from: self.position,
                to: target,
            },
            SelectionMode::Attack => Intent::Attack {
                attacker: self.position,
                target,
            },
        }
    }

    /// False once the selected piece has moved, died or changed hands.
    pub fn is_current(&self, game: &GameState) -> bool {
        game.piece_at(self.position)
            .is_some_and(|pc| pc.owner == self.piece.owner && pc.kind == self.piece.kind)
    }
}
