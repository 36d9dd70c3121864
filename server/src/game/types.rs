use crate::game::{catalog::UnitKind, geometry::Pos};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two seats. Serialized as the bare number `1` or `2`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    pub fn opponent(self) -> PlayerId {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }

    /// `0` for player one, `1` for player two.
    pub fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }
}

impl From<PlayerId> for u8 {
    fn from(p: PlayerId) -> u8 {
        match p {
            PlayerId::One => 1,
            PlayerId::Two => 2,
        }
    }
}

impl TryFrom<u8> for PlayerId {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(PlayerId::One),
            2 => Ok(PlayerId::Two),
            other => Err(format!("no player {other}")),
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", u8::from(*self))
    }
}

/// A base or unit standing on the board.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub kind: UnitKind,
    pub owner: PlayerId,
    pub health: i32, // may go negative on a lethal hit
    pub special_used: bool,
}

impl Piece {
    /// Fresh piece at full health.
    pub fn new(kind: UnitKind, owner: PlayerId) -> Self {
        Piece {
            kind,
            owner,
            health: kind.spec().max_health,
            special_used: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// Per-seat economy.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PlayerState {
    pub energy: u32,
    pub base_placed: bool,
    pub undo_available: bool,
    pub base_position: Option<Pos>,
}

impl PlayerState {
    pub fn new(energy: u32) -> Self {
        PlayerState {
            energy,
            base_placed: false,
            undo_available: true,
            base_position: None,
        }
    }
}

/// The one reversible action of the current turn.
///
/// Base placement and specials are never recorded; they clear the slot.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum UndoRecord {
    PlaceUnit { pos: Pos, kind: UnitKind },
    Move { from: Pos, to: Pos, piece: Piece },
    /// `before` is the target as it stood before the hit, so a slain
    /// unit comes back too.
    Attack { target: Pos, before: Piece },
}

impl UndoRecord {
    /// Energy handed back when the record is undone.
    pub fn refund(&self) -> u32 {
        use crate::game::catalog::{ATTACK_COST, MOVE_COST};
        match self {
            UndoRecord::PlaceUnit { kind, .. } => kind.spec().energy_cost,
            UndoRecord::Move { .. } => MOVE_COST,
            UndoRecord::Attack { .. } => ATTACK_COST,
        }
    }
}

/// Where the state machine stands.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "phase", content = "player")]
pub enum Phase {
    AwaitingBasePlacement(PlayerId),
    AwaitingAction(PlayerId),
    Resolved(PlayerId),
}

impl Phase {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Phase::Resolved(_))
    }
}
