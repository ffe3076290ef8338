use crate::catalog::Catalog;
use crate::config::Config;
use crate::core::board::{BoardError, Cell, GRID_SIZE};
use crate::core::input_router::{BoardAction, Direction};
use crate::core::state::{BingoSignal, BoardState};
use crate::export::{BoardSnapshot, ExportDriver, ExportEvent, ExportOutcome, ShareStatus};
use anyhow::Result;
use rand::rngs::StdRng;

/// Modal shown on top of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    /// A toggle increased the number of completed lines
    Bingo { completed: usize },
    /// Full text of one cell, with a mark/unmark button
    Detail { cell_id: usize },
}

/// Core application state (frontend-agnostic)
///
/// AppCore is the single owner of everything the board screen shows: the
/// board, the cursor, the open overlay and the export driver. Frontends read
/// from it and feed it `BoardAction`s; export tasks report back through
/// `handle_export_event`.
pub struct AppCore {
    /// Application configuration
    pub config: Config,

    /// Prompt pool for new boards
    catalog: Catalog,

    board: BoardState,

    rng: StdRng,

    /// Keyboard cursor (cell id)
    cursor: usize,

    overlay: Option<Overlay>,

    export: ExportDriver,

    /// Application running flag
    pub running: bool,

    /// Set when state changed and the frontend should redraw
    pub needs_render: bool,
}

impl AppCore {
    pub fn new(
        config: Config,
        catalog: Catalog,
        mut rng: StdRng,
        export: ExportDriver,
    ) -> Result<Self> {
        let board = BoardState::new(catalog.prompts(), &mut rng)?;
        tracing::info!("Drew a new board from {} prompts", catalog.len());

        Ok(Self {
            config,
            catalog,
            board,
            rng,
            cursor: 0,
            overlay: None,
            export,
            running: true,
            needs_render: true,
        })
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn overlay(&self) -> Option<Overlay> {
        self.overlay
    }

    pub fn share_status(&self) -> ShareStatus {
        self.export.status()
    }

    pub fn last_export(&self) -> Option<&ExportOutcome> {
        self.export.last_outcome()
    }

    /// Cell shown in the detail overlay, if one is open
    pub fn detail_cell(&self) -> Option<&Cell> {
        match self.overlay {
            Some(Overlay::Detail { cell_id }) => self.board.cell(cell_id),
            _ => None,
        }
    }

    /// Draw a new board and reset everything that belonged to the old one
    pub fn new_board(&mut self) -> Result<(), BoardError> {
        self.board.initialize(self.catalog.prompts(), &mut self.rng)?;
        self.overlay = None;
        self.cursor = 0;
        self.needs_render = true;
        tracing::info!("New board drawn");
        Ok(())
    }

    /// Toggle a cell and open the bingo overlay on a new bingo
    pub fn toggle_cell(&mut self, cell_id: usize) -> Result<BingoSignal, BoardError> {
        let signal = self.board.toggle(cell_id)?;
        if let BingoSignal::NewBingo { completed } = signal {
            tracing::info!("Bingo! {} line(s) complete", completed);
            self.overlay = Some(Overlay::Bingo { completed });
        }
        self.cursor = cell_id;
        self.needs_render = true;
        Ok(signal)
    }

    /// Open the full-text view for a cell
    pub fn show_detail(&mut self, cell_id: usize) {
        if self.board.cell(cell_id).is_none() {
            tracing::warn!("Detail requested for unknown cell {}", cell_id);
            return;
        }
        self.cursor = cell_id;
        self.overlay = Some(Overlay::Detail { cell_id });
        self.needs_render = true;
    }

    /// Mark/unmark button of the detail view: toggle, then close the view
    ///
    /// A resulting bingo replaces the detail view with the bingo overlay.
    pub fn toggle_from_detail(&mut self) -> Result<(), BoardError> {
        if let Some(Overlay::Detail { cell_id }) = self.overlay {
            self.overlay = None;
            let _ = self.toggle_cell(cell_id)?;
        }
        Ok(())
    }

    pub fn dismiss_overlay(&mut self) {
        if self.overlay.take().is_some() {
            self.needs_render = true;
        }
    }

    pub fn move_cursor(&mut self, direction: Direction) {
        let (row, col) = (self.cursor / GRID_SIZE, self.cursor % GRID_SIZE);
        let (row, col) = match direction {
            Direction::Up => ((row + GRID_SIZE - 1) % GRID_SIZE, col),
            Direction::Down => ((row + 1) % GRID_SIZE, col),
            Direction::Left => (row, (col + GRID_SIZE - 1) % GRID_SIZE),
            Direction::Right => (row, (col + 1) % GRID_SIZE),
        };
        self.cursor = row * GRID_SIZE + col;
        self.needs_render = true;
    }

    /// Snapshot the board and start an export; no-op while one is running
    pub fn request_export(&mut self) -> bool {
        let snapshot = BoardSnapshot::capture(self.board.grid(), &self.config.board);
        let started = self.export.request(snapshot);
        self.needs_render = true;
        started
    }

    pub fn handle_export_event(&mut self, event: ExportEvent) {
        self.export.handle_event(event);
        self.needs_render = true;
    }

    /// Apply a routed input action
    pub fn handle_action(&mut self, action: BoardAction) -> Result<()> {
        match action {
            BoardAction::MoveCursor(direction) => self.move_cursor(direction),
            BoardAction::ToggleCursor => {
                let _ = self.toggle_cell(self.cursor)?;
            }
            BoardAction::ToggleCell(cell_id) => {
                let _ = self.toggle_cell(cell_id)?;
            }
            BoardAction::ShowDetailAtCursor => self.show_detail(self.cursor),
            BoardAction::ShowDetail(cell_id) => self.show_detail(cell_id),
            BoardAction::ConfirmOverlay => match self.overlay {
                Some(Overlay::Detail { .. }) => self.toggle_from_detail()?,
                Some(Overlay::Bingo { .. }) => self.dismiss_overlay(),
                None => {}
            },
            BoardAction::DismissOverlay => self.dismiss_overlay(),
            BoardAction::NewBoard => self.new_board()?,
            BoardAction::Export => {
                self.request_export();
            }
            BoardAction::Quit => {
                tracing::info!("Quit requested");
                self.running = false;
            }
            BoardAction::None => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lines::LineId;
    use crate::export::testing::{CountingRenderer, RecordingDownload};
    use crate::export::ExportPipeline;
    use rand::SeedableRng;
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn core_with_renderer(
        renderer: CountingRenderer,
    ) -> (AppCore, mpsc::UnboundedReceiver<ExportEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let pipeline = ExportPipeline::new(
            Box::new(renderer),
            Box::new(RecordingDownload::default()),
            Duration::from_millis(300),
            "mello-bingo.png",
        );
        let driver = ExportDriver::new(pipeline, Duration::from_secs(3), tx);
        let core = AppCore::new(
            Config::default(),
            Catalog::builtin().unwrap(),
            StdRng::seed_from_u64(42),
            driver,
        )
        .unwrap();
        (core, rx)
    }

    fn core() -> AppCore {
        core_with_renderer(CountingRenderer::default()).0
    }

    #[test]
    fn test_row_completion_opens_bingo_overlay() {
        let mut core = core();
        for id in 0..4 {
            let _ = core.toggle_cell(id).unwrap();
            assert_eq!(core.overlay(), None);
        }
        let _ = core.toggle_cell(4).unwrap();
        assert_eq!(core.overlay(), Some(Overlay::Bingo { completed: 1 }));
        assert_eq!(core.board().completed_lines(), &[LineId::Row(0)]);

        core.handle_action(BoardAction::ConfirmOverlay).unwrap();
        assert_eq!(core.overlay(), None);
    }

    #[test]
    fn test_detail_toggle_marks_and_closes() {
        let mut core = core();
        core.handle_action(BoardAction::ShowDetail(7)).unwrap();
        assert_eq!(core.overlay(), Some(Overlay::Detail { cell_id: 7 }));
        assert_eq!(core.detail_cell().map(|c| c.id), Some(7));

        core.handle_action(BoardAction::ConfirmOverlay).unwrap();
        assert_eq!(core.overlay(), None);
        assert!(core.board().grid().is_marked(7));
    }

    #[test]
    fn test_detail_toggle_completing_line_shows_bingo() {
        let mut core = core();
        for id in [0, 6, 12, 18] {
            let _ = core.toggle_cell(id).unwrap();
        }
        core.show_detail(24);
        core.toggle_from_detail().unwrap();
        assert_eq!(core.overlay(), Some(Overlay::Bingo { completed: 1 }));
    }

    #[test]
    fn test_new_board_resets_state() {
        let mut core = core();
        for id in 0..5 {
            let _ = core.toggle_cell(id).unwrap();
        }
        core.move_cursor(Direction::Down);

        for _ in 0..2 {
            core.handle_action(BoardAction::NewBoard).unwrap();
            assert_eq!(core.board().marked_count(), 0);
            assert!(core.board().completed_lines().is_empty());
            assert_eq!(core.overlay(), None);
            assert_eq!(core.cursor(), 0);
        }
    }

    #[test]
    fn test_cursor_wraps_around_edges() {
        let mut core = core();
        core.move_cursor(Direction::Left);
        assert_eq!(core.cursor(), 4);
        core.move_cursor(Direction::Up);
        assert_eq!(core.cursor(), 24);
        core.move_cursor(Direction::Right);
        assert_eq!(core.cursor(), 20);
        core.move_cursor(Direction::Down);
        assert_eq!(core.cursor(), 0);
    }

    #[test]
    fn test_toggle_cursor_uses_cursor_cell() {
        let mut core = core();
        core.move_cursor(Direction::Right);
        core.move_cursor(Direction::Down);
        core.handle_action(BoardAction::ToggleCursor).unwrap();
        assert!(core.board().grid().is_marked(6));
    }

    #[test]
    fn test_toggle_out_of_range_is_error() {
        let mut core = core();
        assert!(core.handle_action(BoardAction::ToggleCell(25)).is_err());
        assert_eq!(core.board().marked_count(), 0);
    }

    #[test]
    fn test_quit() {
        let mut core = core();
        core.handle_action(BoardAction::Quit).unwrap();
        assert!(!core.running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_export_requests_render_once() {
        let renderer = CountingRenderer::default();
        let (mut core, mut rx) = core_with_renderer(renderer.clone());

        assert!(core.request_export());
        assert!(!core.request_export());
        assert_eq!(core.share_status(), ShareStatus::Generating);

        let event = rx.recv().await.unwrap();
        core.handle_export_event(event);
        assert_eq!(core.share_status(), ShareStatus::Success);
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);

        let event = rx.recv().await.unwrap();
        core.handle_export_event(event);
        assert_eq!(core.share_status(), ShareStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_does_not_touch_board() {
        let (mut core, mut rx) = core_with_renderer(CountingRenderer::default());
        let _ = core.toggle_cell(3).unwrap();
        let before = core.board().grid().clone();

        core.handle_action(BoardAction::Export).unwrap();
        let event = rx.recv().await.unwrap();
        core.handle_export_event(event);

        assert_eq!(core.board().grid(), &before);
        assert!(matches!(
            core.last_export(),
            Some(ExportOutcome::Download { .. })
        ));
    }
}
