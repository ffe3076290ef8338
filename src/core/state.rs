//! Board state management
//!
//! Owns the current grid together with the completed lines observed after the
//! previous toggle, and decides when a toggle counts as a new bingo.

use super::board::{BoardError, Cell, Grid};
use super::lines::{detect_completed_lines, LineId};
use rand::Rng;

/// Outcome of a toggle as far as bingo announcements are concerned
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum BingoSignal {
    /// Completed-line count did not grow
    Quiet,
    /// More lines are complete than before the toggle
    NewBingo { completed: usize },
}

impl BingoSignal {
    pub fn is_new_bingo(self) -> bool {
        matches!(self, BingoSignal::NewBingo { .. })
    }
}

/// Grid plus the completed-line set seen after the last toggle
#[derive(Clone, Debug)]
pub struct BoardState {
    grid: Grid,
    completed: Vec<LineId>,
}

impl BoardState {
    /// Generate a fresh board from the catalog
    pub fn new<R: Rng + ?Sized>(catalog: &[String], rng: &mut R) -> Result<Self, BoardError> {
        Ok(Self {
            grid: Grid::generate(catalog, rng)?,
            completed: Vec::new(),
        })
    }

    /// Replace the grid with a newly drawn one and forget all completed lines
    pub fn initialize<R: Rng + ?Sized>(
        &mut self,
        catalog: &[String],
        rng: &mut R,
    ) -> Result<(), BoardError> {
        self.grid = Grid::generate(catalog, rng)?;
        self.completed.clear();
        tracing::debug!("Board initialized with {} cells", self.grid.cells().len());
        Ok(())
    }

    /// Flip one cell and report whether the completed-line count grew
    ///
    /// The comparison is by count only. Unmarking a cell of a finished line
    /// and marking it again announces that line a second time.
    pub fn toggle(&mut self, cell_id: usize) -> Result<BingoSignal, BoardError> {
        self.grid.toggle(cell_id)?;

        let completed = detect_completed_lines(&self.grid);
        let signal = if completed.len() > self.completed.len() {
            BingoSignal::NewBingo {
                completed: completed.len(),
            }
        } else {
            BingoSignal::Quiet
        };

        tracing::debug!(
            "Toggled cell {} -> marked={}, completed lines: {:?}",
            cell_id,
            self.grid.is_marked(cell_id),
            completed
        );

        self.completed = completed;
        Ok(signal)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cell(&self, id: usize) -> Option<&Cell> {
        self.grid.cell(id)
    }

    pub fn completed_lines(&self) -> &[LineId] {
        &self.completed
    }

    pub fn marked_count(&self) -> usize {
        self.grid.marked_count()
    }

    #[cfg(test)]
    pub fn from_grid(grid: Grid) -> Self {
        let completed = detect_completed_lines(&grid);
        Self { grid, completed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fixed_state() -> BoardState {
        BoardState::from_grid(Grid::from_texts((0..25).map(|i| format!("Cell {}", i))).unwrap())
    }

    fn catalog() -> Vec<String> {
        (0..40).map(|i| format!("Prompt {}", i)).collect()
    }

    #[test]
    fn test_completing_row_fires_once() {
        let mut state = fixed_state();
        for id in 0..4 {
            assert_eq!(state.toggle(id).unwrap(), BingoSignal::Quiet);
        }
        assert_eq!(
            state.toggle(4).unwrap(),
            BingoSignal::NewBingo { completed: 1 }
        );
        assert_eq!(state.completed_lines(), &[LineId::Row(0)]);

        // Unrelated mark afterwards stays quiet
        assert_eq!(state.toggle(10).unwrap(), BingoSignal::Quiet);
    }

    #[test]
    fn test_unmark_then_remark_fires_again() {
        let mut state = fixed_state();
        for id in 0..5 {
            let _ = state.toggle(id).unwrap();
        }

        assert_eq!(state.toggle(2).unwrap(), BingoSignal::Quiet);
        assert!(state.completed_lines().is_empty());

        assert!(state.toggle(2).unwrap().is_new_bingo());
        assert_eq!(state.completed_lines(), &[LineId::Row(0)]);
    }

    #[test]
    fn test_one_toggle_completing_two_lines() {
        let mut state = fixed_state();
        // Row 0 except 0, column 0 except 0
        for id in [1, 2, 3, 4, 5, 10, 15, 20] {
            let _ = state.toggle(id).unwrap();
        }
        assert_eq!(
            state.toggle(0).unwrap(),
            BingoSignal::NewBingo { completed: 2 }
        );
        assert_eq!(
            state.completed_lines(),
            &[LineId::Row(0), LineId::Column(0)]
        );
    }

    #[test]
    fn test_count_comparison_ignores_which_line() {
        let mut state = fixed_state();
        for id in [0, 1, 2, 3, 4] {
            let _ = state.toggle(id).unwrap();
        }
        // Breaking row 0 leaves zero complete lines: quiet even though
        // the set changed
        assert_eq!(state.toggle(0).unwrap(), BingoSignal::Quiet);
        assert_eq!(state.completed_lines().len(), 0);
    }

    #[test]
    fn test_toggle_out_of_range_leaves_state() {
        let mut state = fixed_state();
        assert_eq!(state.toggle(99), Err(BoardError::CellOutOfRange(99)));
        assert_eq!(state.marked_count(), 0);
    }

    #[test]
    fn test_initialize_resets_everything() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = BoardState::new(&catalog(), &mut rng).unwrap();
        for id in 0..25 {
            let _ = state.toggle(id).unwrap();
        }
        assert_eq!(state.completed_lines().len(), 12);

        for _ in 0..2 {
            state.initialize(&catalog(), &mut rng).unwrap();
            assert_eq!(state.marked_count(), 0);
            assert!(state.completed_lines().is_empty());
            assert_eq!(state.grid().cells().len(), 25);
        }
    }

    #[test]
    fn test_initialize_with_bad_catalog_keeps_old_board() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = BoardState::new(&catalog(), &mut rng).unwrap();
        let _ = state.toggle(0).unwrap();
        let before = state.grid().clone();

        let small: Vec<String> = vec!["a".to_string()];
        assert!(state.initialize(&small, &mut rng).is_err());
        assert_eq!(state.grid(), &before);
    }
}
