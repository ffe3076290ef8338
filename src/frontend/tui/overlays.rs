//! Modal popups drawn over the board.
//!
//! Provides click hit-testing and rendering for the bingo celebration and
//! the cell detail view.

use super::board_view::{contains, lines_label};
use crate::core::{AppCore, BoardAction, Overlay};
use crate::theme::BingoTheme;
use crossterm::event::{MouseButton, MouseEventKind};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Clear, Paragraph, Wrap},
    Frame,
};

pub const BINGO_TITLE: &str = "BINGO!";
pub const BINGO_MESSAGE: &str = "Du har fått en ny rad! Snyggt jobbat!";
pub const CONTINUE_LABEL: &str = "Fortsätt spela";
pub const MARK_LABEL: &str = "Markera";
pub const UNMARK_LABEL: &str = "Avmarkera";

/// Popup and primary button position for one overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayLayout {
    pub popup: Rect,
    pub button: Rect,
}

impl OverlayLayout {
    pub fn compute(area: Rect, overlay: Overlay, button_label: &str) -> Self {
        let (width, height) = match overlay {
            Overlay::Bingo { .. } => (46, 9),
            Overlay::Detail { .. } => (52, 12),
        };
        let width = width.min(area.width);
        let height = height.min(area.height);
        let popup = Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        );

        // Bottom row inside the border
        let button_width = (button_label.chars().count() as u16 + 4).min(width);
        let button = Rect::new(
            popup.x + (width - button_width) / 2,
            (popup.y + height).saturating_sub(2).max(popup.y),
            button_width,
            height.min(1),
        )
        .intersection(popup);

        Self { popup, button }
    }

    /// Clicking the button confirms, clicking outside the popup dismisses
    pub fn action_at(&self, kind: MouseEventKind, x: u16, y: u16) -> BoardAction {
        match kind {
            MouseEventKind::Down(MouseButton::Left) if contains(self.button, x, y) => {
                BoardAction::ConfirmOverlay
            }
            MouseEventKind::Down(_) if !contains(self.popup, x, y) => BoardAction::DismissOverlay,
            _ => BoardAction::None,
        }
    }
}

/// Label of the primary button for an overlay
pub fn button_label(core: &AppCore, overlay: Overlay) -> &'static str {
    match overlay {
        Overlay::Bingo { .. } => CONTINUE_LABEL,
        Overlay::Detail { cell_id } => match core.board().cell(cell_id) {
            Some(cell) if cell.is_marked => UNMARK_LABEL,
            _ => MARK_LABEL,
        },
    }
}

pub fn render_overlay(
    frame: &mut Frame,
    layout: &OverlayLayout,
    overlay: Overlay,
    core: &AppCore,
    theme: &BingoTheme,
) {
    frame.render_widget(Clear, layout.popup);

    let (block, lines) = match overlay {
        Overlay::Bingo { completed } => {
            let block = Block::bordered()
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(theme.gold.to_color()));
            let lines = vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("★ {} ★", BINGO_TITLE),
                    Style::default()
                        .fg(theme.gold.to_color())
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(BINGO_MESSAGE),
                Line::from(Span::styled(
                    lines_label(completed),
                    Style::default().fg(theme.text_dim.to_color()),
                )),
            ];
            (block, lines)
        }
        Overlay::Detail { cell_id } => {
            let block = Block::bordered()
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(theme.pink.to_color()))
                .title(format!(" Ruta {} ", cell_id + 1));
            let text = core
                .detail_cell()
                .map(|cell| cell.text.clone())
                .unwrap_or_default();
            (block, vec![Line::from(""), Line::from(text)])
        }
    };

    let paragraph = Paragraph::new(lines)
        .block(block.style(Style::default().bg(theme.background.to_color())))
        .style(Style::default().fg(theme.text.to_color()))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, layout.popup);

    let button = Paragraph::new(button_label(core, overlay))
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(theme.background.to_color())
                .bg(theme.pink.to_color())
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(button, layout.button);
}
