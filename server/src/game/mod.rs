//! Rules engine and the per-game session actor that drives it.

pub mod board;
pub mod catalog;
pub mod error;
pub mod geometry;
pub mod logic;
pub mod selection;
pub mod session;
pub mod snapshot;
pub mod turn_log;
pub mod types;
