//! Full-replace public view of a game, sent after every accepted intent.
//!
//! Observers never patch their copy; they swap it for the newest snapshot.

use crate::game::{
    catalog::{health_fraction, UnitKind},
    logic::GameState,
    types::{Phase, Piece, PlayerId, PlayerState},
};
use serde::{Deserialize, Serialize};

/// What a client needs to draw one occupied cell.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CellView {
    pub kind: UnitKind,
    pub owner: PlayerId,
    pub icon: String,
    pub health: i32,
    pub max_health: i32,
    /// `health / GLOBAL_MAX_HEALTH`, so bars compare across kinds.
    pub health_fraction: f32,
    pub special_used: bool,
}

impl From<&Piece> for CellView {
    fn from(pc: &Piece) -> Self {
        let spec = pc.kind.spec();
        CellView {
            kind: pc.kind,
            owner: pc.owner,
            icon: spec.icon.to_string(),
            health: pc.health,
            max_health: spec.max_health,
            health_fraction: health_fraction(pc.health),
            special_used: pc.special_used,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Snapshot {
    pub turn: u32,
    pub phase: Phase,
    pub current_player: PlayerId,
    pub players: [PlayerState; 2],
    /// Rows top to bottom, `None` for an empty cell.
    pub board: Vec<Vec<Option<CellView>>>,
    pub turn_log: Vec<String>,
    pub last_turn_log: Vec<String>,
    pub winner: Option<PlayerId>,
}

impl From<&GameState> for Snapshot {
    fn from(gs: &GameState) -> Self {
        let board = gs
            .board()
            .rows()
            .map(|row| row.iter().map(|c| c.as_ref().map(CellView::from)).collect())
            .collect();
        Snapshot {
            turn: gs.turn(),
            phase: gs.phase(),
            current_player: gs.current_player(),
            players: gs.players().clone(),
            board,
            turn_log: gs.turn_log().entries().to_vec(),
            last_turn_log: gs.last_turn_log().to_vec(),
            winner: gs.winner(),
        }
    }
}

impl Snapshot {
    /// Snapshot of a game nobody has touched yet.
    pub fn initial() -> Self {
        Snapshot::from(&GameState::new())
    }

    pub fn cell(&self, row: u8, col: u8) -> Option<&CellView> {
        self.board.get(row as usize)?.get(col as usize)?.as_ref()
    }
}
