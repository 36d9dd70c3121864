//! Grid positions and the pure distance helpers the rules are built on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Side length of the (square) battlefield.
pub const BOARD_SIZE: u8 = 8;

/// One cell of the grid, `(row, col)`, both in `[0, BOARD_SIZE)` when valid.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
    pub row: u8,
    pub col: u8,
}

impl Pos {
    pub const fn new(row: u8, col: u8) -> Self {
        Pos { row, col }
    }

    /// Row-major index into a flat `BOARD_SIZE²` array.
    pub fn index(self) -> usize {
        self.row as usize * BOARD_SIZE as usize + self.col as usize
    }

    /// Inverse of [`Pos::index`].
    pub fn from_index(idx: usize) -> Self {
        let n = BOARD_SIZE as usize;
        Pos::new((idx / n) as u8, (idx % n) as u8)
    }

    /// Applies a signed offset, returning `None` if the result leaves the grid.
    pub fn offset(self, d_row: i16, d_col: i16) -> Option<Pos> {
        let row = self.row as i16 + d_row;
        let col = self.col as i16 + d_col;
        let n = BOARD_SIZE as i16;
        if (0..n).contains(&row) && (0..n).contains(&col) {
            Some(Pos::new(row as u8, col as u8))
        } else {
            None
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

pub fn is_in_bounds(pos: Pos) -> bool {
    pos.row < BOARD_SIZE && pos.col < BOARD_SIZE
}

pub fn manhattan_distance(a: Pos, b: Pos) -> u32 {
    (a.row.abs_diff(b.row) as u32) + (a.col.abs_diff(b.col) as u32)
}

/// King-move distance; the deployment zone is everything at distance 1.
pub fn chebyshev_distance(a: Pos, b: Pos) -> u32 {
    a.row.abs_diff(b.row).max(a.col.abs_diff(b.col)) as u32
}

/// True only for the four edge neighbours; diagonals are not adjacent.
pub fn orthogonal_adjacent(a: Pos, b: Pos) -> bool {
    manhattan_distance(a, b) == 1
}

/// Every in-bounds cell with `manhattan_distance(center, cell) <= range`,
/// including `center` itself, in row-major order.
pub fn cells_within_range(center: Pos, range: u32) -> Vec<Pos> {
    let r = range.min(2 * BOARD_SIZE as u32) as i16;
    let mut cells = Vec::new();
    for d_row in -r..=r {
        let rest = r - d_row.abs();
        for d_col in -rest..=rest {
            if let Some(p) = center.offset(d_row, d_col) {
                cells.push(p);
            }
        }
    }
    cells
}

/// The (up to) four orthogonal neighbours of `pos`, row-major.
pub fn orthogonal_neighbours(pos: Pos) -> Vec<Pos> {
    [(-1, 0), (0, -1), (0, 1), (1, 0)]
        .into_iter()
        .filter_map(|(dr, dc)| pos.offset(dr, dc))
        .collect()
}

/// The (up to) eight surrounding cells of `pos`, row-major.
pub fn ring(pos: Pos) -> Vec<Pos> {
    let mut cells = Vec::with_capacity(8);
    for dr in -1..=1 {
        for dc in -1..=1 {
            if dr == 0 && dc == 0 {
                continue;
            }
            if let Some(p) = pos.offset(dr, dc) {
                cells.push(p);
            }
        }
    }
    cells
}

/// All cells of the grid in row-major order.
pub fn all_cells() -> impl Iterator<Item = Pos> {
    (0..BOARD_SIZE as usize * BOARD_SIZE as usize).map(Pos::from_index)
}
