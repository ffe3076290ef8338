use super::board_view::{self, BoardLayout};
use super::overlays::{self, OverlayLayout};
use crate::core::{AppCore, BoardAction};
use crate::frontend::{Frontend, FrontendEvent};
use crate::theme::BingoTheme;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;

/// TUI Frontend using ratatui
///
/// Renders the board using ratatui and handles events via crossterm.
pub struct TuiFrontend {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    poll_timeout: Duration,
    theme: BingoTheme,
    /// Rectangles of the last rendered frame, for mouse hit-testing
    board_layout: Option<BoardLayout>,
    overlay_layout: Option<OverlayLayout>,
}

impl TuiFrontend {
    /// Create a new TUI frontend
    ///
    /// Initializes terminal in raw mode, enables mouse capture, and enters alternate screen.
    pub fn new(theme: BingoTheme) -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
            .context("Failed to setup terminal")?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor()?;

        Ok(Self {
            terminal,
            poll_timeout: Duration::from_millis(16), // ~60 FPS
            theme,
            board_layout: None,
            overlay_layout: None,
        })
    }

    /// Set poll timeout (for controlling frame rate)
    pub fn set_poll_timeout(&mut self, timeout: Duration) {
        self.poll_timeout = timeout;
    }

    /// Convert crossterm event to FrontendEvent
    fn convert_event(event: Event) -> Option<FrontendEvent> {
        match event {
            Event::Key(key_event) => {
                // Only process key press events (ignore repeats and releases)
                if key_event.kind != KeyEventKind::Press {
                    return None;
                }
                Some(FrontendEvent::key(key_event.code, key_event.modifiers))
            }
            Event::Mouse(mouse_event) => Some(FrontendEvent::mouse(
                mouse_event.kind,
                mouse_event.column,
                mouse_event.row,
            )),
            Event::Resize(w, h) => Some(FrontendEvent::resize(w, h)),
            _ => None,
        }
    }
}

impl Frontend for TuiFrontend {
    fn poll_events(&mut self) -> Result<Vec<FrontendEvent>> {
        let mut events = Vec::new();

        // Wait up to the poll timeout for the first event, then drain the rest
        let mut timeout = self.poll_timeout;
        while event::poll(timeout)? {
            if let Some(frontend_event) = Self::convert_event(event::read()?) {
                events.push(frontend_event);
            }
            timeout = Duration::ZERO;
        }

        Ok(events)
    }

    fn render(&mut self, core: &AppCore) -> Result<()> {
        let theme = &self.theme;
        let mut layouts = None;

        self.terminal.draw(|f| {
            let area = f.area();
            let board_layout = BoardLayout::compute(area);
            board_view::render_board(f, &board_layout, core, theme);

            let overlay_layout = core.overlay().map(|overlay| {
                let label = overlays::button_label(core, overlay);
                let layout = OverlayLayout::compute(area, overlay, label);
                overlays::render_overlay(f, &layout, overlay, core, theme);
                layout
            });

            layouts = Some((board_layout, overlay_layout));
        })?;

        if let Some((board_layout, overlay_layout)) = layouts {
            self.board_layout = Some(board_layout);
            self.overlay_layout = overlay_layout;
        }
        Ok(())
    }

    fn mouse_action(
        &self,
        kind: MouseEventKind,
        x: u16,
        y: u16,
        overlay_open: bool,
    ) -> BoardAction {
        // A layout from before the overlay opened or closed must not be hit
        let layout = if overlay_open {
            self.overlay_layout.map(|overlay| overlay.action_at(kind, x, y))
        } else {
            self.board_layout.as_ref().map(|board| board.action_at(kind, x, y))
        };
        layout.unwrap_or(BoardAction::None)
    }

    fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        let size = self.terminal.size().unwrap_or_default();
        (size.width, size.height)
    }
}

impl Drop for TuiFrontend {
    fn drop(&mut self) {
        // Ensure terminal is restored even if cleanup() wasn't called
        let _ = self.cleanup();
    }
}
