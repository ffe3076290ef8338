//! Line-completion detection
//!
//! Twelve lines: five rows, five columns and the two diagonals. Indices are
//! computed from the line id on demand; nothing is cached between calls.

use super::board::{Grid, GRID_SIZE};
use std::fmt;

/// A row, column or diagonal of the card
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LineId {
    Row(usize),
    Column(usize),
    /// Top-left to bottom-right
    MainDiagonal,
    /// Top-right to bottom-left
    AntiDiagonal,
}

impl LineId {
    /// All lines in detection order: rows, columns, main diagonal, anti diagonal
    pub fn all() -> impl Iterator<Item = LineId> {
        (0..GRID_SIZE)
            .map(LineId::Row)
            .chain((0..GRID_SIZE).map(LineId::Column))
            .chain([LineId::MainDiagonal, LineId::AntiDiagonal])
    }

    /// Row-major cell indices covered by this line
    pub fn indices(self) -> [usize; GRID_SIZE] {
        let mut indices = [0; GRID_SIZE];
        for (k, slot) in indices.iter_mut().enumerate() {
            *slot = match self {
                LineId::Row(i) => i * GRID_SIZE + k,
                LineId::Column(i) => i + k * GRID_SIZE,
                LineId::MainDiagonal => k * (GRID_SIZE + 1),
                LineId::AntiDiagonal => (k + 1) * (GRID_SIZE - 1),
            };
        }
        indices
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineId::Row(i) => write!(f, "row-{}", i),
            LineId::Column(i) => write!(f, "col-{}", i),
            LineId::MainDiagonal => write!(f, "diag-1"),
            LineId::AntiDiagonal => write!(f, "diag-2"),
        }
    }
}

/// Every fully marked line of the grid, in `LineId::all()` order
pub fn detect_completed_lines(grid: &Grid) -> Vec<LineId> {
    LineId::all()
        .filter(|line| line.indices().iter().all(|&idx| grid.is_marked(idx)))
        .collect()
}
