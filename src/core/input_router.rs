//! Input routing for the bingo board
//!
//! Maps keyboard input to a `BoardAction` based on whether an overlay
//! currently has focus. Mouse input is hit-tested by the frontend, which
//! knows where cells are drawn, and arrives here already as an action.

use crossterm::event::{KeyCode, KeyModifiers};

/// Cursor movement on the 5x5 grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Everything the user can ask the board to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardAction {
    MoveCursor(Direction),
    /// Toggle the cell under the cursor
    ToggleCursor,
    ToggleCell(usize),
    /// Open the full-text view of the cell under the cursor
    ShowDetailAtCursor,
    ShowDetail(usize),
    /// Primary button of the open overlay
    ConfirmOverlay,
    DismissOverlay,
    NewBoard,
    Export,
    Quit,
    None,
}

/// Route a key press to a board action
pub fn route_key(code: KeyCode, modifiers: KeyModifiers, overlay_open: bool) -> BoardAction {
    if modifiers.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        return BoardAction::Quit;
    }

    if overlay_open {
        return match code {
            KeyCode::Enter | KeyCode::Char(' ') => BoardAction::ConfirmOverlay,
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') => BoardAction::DismissOverlay,
            _ => BoardAction::None,
        };
    }

    match code {
        KeyCode::Up | KeyCode::Char('k') => BoardAction::MoveCursor(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') => BoardAction::MoveCursor(Direction::Down),
        KeyCode::Left | KeyCode::Char('h') => BoardAction::MoveCursor(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') => BoardAction::MoveCursor(Direction::Right),
        KeyCode::Enter | KeyCode::Char(' ') => BoardAction::ToggleCursor,
        KeyCode::Char('i') | KeyCode::Char('?') => BoardAction::ShowDetailAtCursor,
        KeyCode::Char('n') => BoardAction::NewBoard,
        KeyCode::Char('c') | KeyCode::Char('e') => BoardAction::Export,
        KeyCode::Char('q') => BoardAction::Quit,
        _ => BoardAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_keys() {
        assert_eq!(
            route_key(KeyCode::Left, KeyModifiers::NONE, false),
            BoardAction::MoveCursor(Direction::Left)
        );
        assert_eq!(
            route_key(KeyCode::Char('j'), KeyModifiers::NONE, false),
            BoardAction::MoveCursor(Direction::Down)
        );
        assert_eq!(
            route_key(KeyCode::Char(' '), KeyModifiers::NONE, false),
            BoardAction::ToggleCursor
        );
        assert_eq!(
            route_key(KeyCode::Char('n'), KeyModifiers::NONE, false),
            BoardAction::NewBoard
        );
        assert_eq!(
            route_key(KeyCode::Char('c'), KeyModifiers::NONE, false),
            BoardAction::Export
        );
    }

    #[test]
    fn test_overlay_captures_keys() {
        assert_eq!(
            route_key(KeyCode::Enter, KeyModifiers::NONE, true),
            BoardAction::ConfirmOverlay
        );
        assert_eq!(
            route_key(KeyCode::Esc, KeyModifiers::NONE, true),
            BoardAction::DismissOverlay
        );
        assert_eq!(
            route_key(KeyCode::Char('n'), KeyModifiers::NONE, true),
            BoardAction::None
        );
    }

    #[test]
    fn test_ctrl_c_always_quits() {
        assert_eq!(
            route_key(KeyCode::Char('c'), KeyModifiers::CONTROL, false),
            BoardAction::Quit
        );
        assert_eq!(
            route_key(KeyCode::Char('c'), KeyModifiers::CONTROL, true),
            BoardAction::Quit
        );
    }
}
