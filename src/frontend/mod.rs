//! Frontend abstraction layer
//!
//! This module defines the `Frontend` trait the terminal frontend implements.
//! It provides a unified interface for event polling, rendering, and cleanup.

pub mod events;
pub mod tui;

use crate::core::{AppCore, BoardAction};
use anyhow::Result;
use crossterm::event::MouseEventKind;
pub use events::FrontendEvent;
pub use tui::TuiFrontend;

/// Frontend trait
///
/// Separates rendering concerns from the board logic in `AppCore`.
pub trait Frontend {
    /// Poll for user input events
    ///
    /// Returns all pending events converted to `FrontendEvent` (empty if none
    /// arrived within the poll timeout).
    fn poll_events(&mut self) -> Result<Vec<FrontendEvent>>;

    /// Render the current application state
    fn render(&mut self, core: &AppCore) -> Result<()>;

    /// Translate a mouse event into a board action
    ///
    /// Only the frontend knows where cells and buttons were drawn, so hit
    /// testing lives here. Uses the layout of the last rendered frame;
    /// `overlay_open` says whether clicks go to the overlay or the board.
    fn mouse_action(
        &self,
        kind: MouseEventKind,
        x: u16,
        y: u16,
        overlay_open: bool,
    ) -> BoardAction;

    /// Restore the terminal before the application exits
    fn cleanup(&mut self) -> Result<()>;

    /// Current terminal size `(width, height)` in characters
    fn size(&self) -> (u16, u16);
}
