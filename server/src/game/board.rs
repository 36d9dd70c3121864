//! N×N occupancy grid. Knows nothing about turns or energy.

use crate::game::{
    geometry::{all_cells, is_in_bounds, Pos, BOARD_SIZE},
    types::{Piece, PlayerId},
};
use serde::{Deserialize, Serialize};

const CELLS: usize = BOARD_SIZE as usize * BOARD_SIZE as usize;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Board {
    cells: Vec<Option<Piece>>, // row-major, always CELLS long
}

impl Default for Board {
    fn default() -> Self {
        Board {
            cells: vec![None; CELLS],
        }
    }
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pos: Pos) -> Option<&Piece> {
        if !is_in_bounds(pos) {
            return None;
        }
        self.cells[pos.index()].as_ref()
    }

    pub fn get_mut(&mut self, pos: Pos) -> Option<&mut Piece> {
        if !is_in_bounds(pos) {
            return None;
        }
        self.cells[pos.index()].as_mut()
    }

    /// In-bounds and unoccupied.
    pub fn is_empty(&self, pos: Pos) -> bool {
        is_in_bounds(pos) && self.cells[pos.index()].is_none()
    }

    /// Overwrites whatever is at `pos`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, pos: Pos, piece: Option<Piece>) {
        if is_in_bounds(pos) {
            self.cells[pos.index()] = piece;
        }
    }

    pub fn remove(&mut self, pos: Pos) -> Option<Piece> {
        if !is_in_bounds(pos) {
            return None;
        }
        self.cells[pos.index()].take()
    }

    /// Occupied cells in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Pos, &Piece)> {
        all_cells().filter_map(move |p| self.cells[p.index()].as_ref().map(|pc| (p, pc)))
    }

    pub fn pieces_of(&self, owner: PlayerId) -> impl Iterator<Item = (Pos, &Piece)> {
        self.pieces().filter(move |(_, pc)| pc.owner == owner)
    }

    /// Cells holding `owner`'s base. One at most under the rules, but the
    /// deployment zone is defined over all of them.
    pub fn base_cells(&self, owner: PlayerId) -> Vec<Pos> {
        self.pieces_of(owner)
            .filter(|(_, pc)| pc.kind.is_base())
            .map(|(p, _)| p)
            .collect()
    }

    /// Rows of cells, top row first.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<Piece>]> {
        self.cells.chunks(BOARD_SIZE as usize)
    }
}
