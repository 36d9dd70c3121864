//! Human-readable record of what happened this turn.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct TurnLog {
    entries: Vec<String>,
}

impl TurnLog {
    pub fn push(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
    }

    /// Drops the most recent entry; used when its action is undone.
    pub fn retract(&mut self) -> Option<String> {
        self.entries.pop()
    }

    /// Empties the log, handing back what it held.
    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.entries)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
