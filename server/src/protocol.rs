//! Wire-protocol shared by client, WS handler and game session.

use crate::game::{
    error::RuleError,
    geometry::Pos,
    logic::Intent,
    selection::{Highlights, SelectionMode},
    snapshot::Snapshot,
    types::PlayerId,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------- client → server ----------
// The acting seat is never carried here: the session derives it from the
// socket's client id.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ClientMsg {
    /// Submit one intent for the seat bound to this socket.
    Act { intent: Intent },
    /// First click of the two-click flow.
    Select { pos: Pos },
    /// Second click: apply the pending selection to `target`.
    Target { mode: SelectionMode, target: Pos },
    /// Drop the pending selection.
    Cancel,
    /// Start over once the current game is resolved.
    Reset,
}

/// Role a client got when joining a session.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "role", content = "player")]
pub enum Seat {
    Player(PlayerId),
    Observer,
}

impl Seat {
    pub fn player(self) -> Option<PlayerId> {
        match self {
            Seat::Player(p) => Some(p),
            Seat::Observer => None,
        }
    }
}

// ---------- server → client ----------
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ServerMsg {
    Welcome {
        game_id: Uuid,
        seat: Seat,
    },
    GameStart {
        game_id: Uuid,
    },
    /// Fresh full snapshot; replaces whatever the client holds.
    State {
        game_id: Uuid,
        snapshot: Snapshot,
    },
    /// Sent only to the client whose intent was refused.
    Rejected {
        game_id: Uuid,
        reason: RuleError,
        message: String,
    },
    Highlights {
        game_id: Uuid,
        selected: Option<Pos>,
        highlights: Highlights,
    },
    GameOver {
        game_id: Uuid,
        winner: PlayerId,
    },
    /// Transport-level refusal (spectator acting, bad frame, ...).
    Error {
        message: String,
    },
}

impl ServerMsg {
    pub fn rejected(game_id: Uuid, reason: RuleError) -> Self {
        ServerMsg::Rejected {
            game_id,
            message: reason.to_string(),
            reason,
        }
    }
}
