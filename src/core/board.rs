//! Bingo grid model and board generator
//!
//! A grid is 25 cells in row-major order. Cell ids equal their position, so
//! line definitions can index straight into the cell vector.

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

/// Cells per row and column
pub const GRID_SIZE: usize = 5;

/// Total cells on a card
pub const GRID_CELLS: usize = GRID_SIZE * GRID_SIZE;

/// Errors raised by board generation and mutation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("catalog has {found} prompts, a card needs at least {required}")]
    CatalogTooSmall { found: usize, required: usize },

    #[error("catalog contains the prompt {0:?} more than once")]
    DuplicatePrompt(String),

    #[error("catalog prompt #{index} is empty")]
    EmptyPrompt { index: usize },

    #[error("cell id {0} is outside the board (0..{max})", max = GRID_CELLS - 1)]
    CellOutOfRange(usize),
}

/// One position on the card
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    /// Row-major position (row * 5 + col)
    pub id: usize,
    pub text: String,
    pub is_marked: bool,
}

/// Exactly 25 cells, row-major, with pairwise distinct texts
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Cell>,
}

impl Grid {
    /// Draw a uniform 25-prompt sample from the catalog and lay it out
    ///
    /// Uses a Fisher-Yates shuffle over a copy of the catalog. Duplicate
    /// texts in the catalog would break the distinctness invariant, so
    /// callers are expected to pass a validated catalog.
    pub fn generate<R: Rng + ?Sized>(catalog: &[String], rng: &mut R) -> Result<Self, BoardError> {
        if catalog.len() < GRID_CELLS {
            return Err(BoardError::CatalogTooSmall {
                found: catalog.len(),
                required: GRID_CELLS,
            });
        }

        let mut pool: Vec<&String> = catalog.iter().collect();
        pool.shuffle(rng);

        let cells = pool
            .into_iter()
            .take(GRID_CELLS)
            .enumerate()
            .map(|(id, text)| Cell {
                id,
                text: text.clone(),
                is_marked: false,
            })
            .collect();

        Ok(Self { cells })
    }

    /// Build an unmarked grid from exactly 25 texts in row-major order
    #[cfg(test)]
    pub fn from_texts<S: Into<String>>(texts: impl IntoIterator<Item = S>) -> Result<Self, BoardError> {
        let cells: Vec<Cell> = texts
            .into_iter()
            .take(GRID_CELLS)
            .enumerate()
            .map(|(id, text)| Cell {
                id,
                text: text.into(),
                is_marked: false,
            })
            .collect();

        if cells.len() < GRID_CELLS {
            return Err(BoardError::CatalogTooSmall {
                found: cells.len(),
                required: GRID_CELLS,
            });
        }

        Ok(Self { cells })
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, id: usize) -> Option<&Cell> {
        self.cells.get(id)
    }

    pub fn is_marked(&self, id: usize) -> bool {
        self.cells.get(id).is_some_and(|cell| cell.is_marked)
    }

    /// Flip the marked flag of one cell, leaving all others untouched
    pub fn toggle(&mut self, id: usize) -> Result<(), BoardError> {
        let cell = self
            .cells
            .get_mut(id)
            .ok_or(BoardError::CellOutOfRange(id))?;
        cell.is_marked = !cell.is_marked;
        Ok(())
    }

    pub fn marked_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_marked).count()
    }
}
