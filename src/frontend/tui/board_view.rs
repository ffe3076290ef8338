//! Board screen: header, 5x5 grid, controls and status lines.
//!
//! Layout is computed separately from drawing so mouse clicks can be
//! hit-tested against the rectangles of the last rendered frame.

use crate::core::board::{Cell, GRID_SIZE};
use crate::core::{AppCore, BoardAction};
use crate::export::{ExportOutcome, ShareStatus};
use crate::theme::BingoTheme;
use crossterm::event::{MouseButton, MouseEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph, Wrap},
    Frame,
};

/// Widest the board is drawn, in columns
const MAX_WIDTH: u16 = 110;
const BUTTON_WIDTH: u16 = 16;
const BUTTON_GAP: u16 = 4;
/// Smallest area the full board is laid out in
const MIN_WIDTH: u16 = BUTTON_WIDTH * 2 + BUTTON_GAP;
const MIN_HEIGHT: u16 = 2 + GRID_SIZE as u16 * 2 + 3;

pub const TOO_SMALL_MESSAGE: &str = "Terminalen är för liten";

/// Texts longer than this get an info marker pointing to the detail view
pub const LONG_TEXT_CHARS: usize = 30;

pub const NEW_BOARD_LABEL: &str = "Ny bricka";

/// Export button label for a share status
pub fn export_label(status: ShareStatus) -> &'static str {
    match status {
        ShareStatus::Idle => "Kopiera bild",
        ShareStatus::Generating => "Skapar...",
        ShareStatus::Success => "Kopierad!",
        ShareStatus::Error => "Misslyckades",
    }
}

/// "1 rad klar", "3 rader klara"
pub(crate) fn lines_label(lines: usize) -> String {
    if lines == 1 {
        "1 rad klar".to_string()
    } else {
        format!("{} rader klara", lines)
    }
}

pub(crate) fn contains(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

/// Screen rectangles of one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardLayout {
    /// Whole frame; everything else is empty when the board does not fit
    pub area: Rect,
    pub fits: bool,
    pub header: Rect,
    /// One rect per cell, indexed by cell id
    pub cells: Vec<Rect>,
    pub new_board_button: Rect,
    pub export_button: Rect,
    pub status: Rect,
    pub help: Rect,
}

impl BoardLayout {
    pub fn compute(area: Rect) -> Self {
        if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
            return Self {
                area,
                fits: false,
                header: Rect::default(),
                cells: Vec::new(),
                new_board_button: Rect::default(),
                export_button: Rect::default(),
                status: Rect::default(),
                help: Rect::default(),
            };
        }

        let frame = area;
        let width = area.width.min(MAX_WIDTH);
        let area = Rect::new(area.x + (area.width - width) / 2, area.y, width, area.height);

        let rows = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(GRID_SIZE as u16 * 2),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

        let cells = Layout::vertical([Constraint::Ratio(1, GRID_SIZE as u32); GRID_SIZE])
            .split(rows[1])
            .iter()
            .flat_map(|row| {
                Layout::horizontal([Constraint::Ratio(1, GRID_SIZE as u32); GRID_SIZE])
                    .split(*row)
                    .to_vec()
            })
            .collect();

        let controls = rows[2];
        let height = controls.height.min(1);
        let buttons_width = (BUTTON_WIDTH * 2 + BUTTON_GAP).min(controls.width);
        let left = controls.x + (controls.width - buttons_width) / 2;
        let new_board_button =
            Rect::new(left, controls.y, BUTTON_WIDTH.min(buttons_width), height).intersection(frame);
        let export_x = (left + BUTTON_WIDTH + BUTTON_GAP).min(controls.x + controls.width);
        let export_button = Rect::new(
            export_x,
            controls.y,
            BUTTON_WIDTH.min(controls.x + controls.width - export_x),
            height,
        )
        .intersection(frame);

        Self {
            area: frame,
            fits: true,
            header: rows[0],
            cells,
            new_board_button,
            export_button,
            status: rows[3],
            help: rows[4],
        }
    }

    /// Cell id under a screen position
    pub fn cell_at(&self, x: u16, y: u16) -> Option<usize> {
        self.cells.iter().position(|rect| contains(*rect, x, y))
    }

    /// Board action for a mouse event when no overlay is open
    ///
    /// Left click toggles a cell, right click opens its detail view.
    pub fn action_at(&self, kind: MouseEventKind, x: u16, y: u16) -> BoardAction {
        match kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if contains(self.new_board_button, x, y) {
                    BoardAction::NewBoard
                } else if contains(self.export_button, x, y) {
                    BoardAction::Export
                } else if let Some(id) = self.cell_at(x, y) {
                    BoardAction::ToggleCell(id)
                } else {
                    BoardAction::None
                }
            }
            MouseEventKind::Down(MouseButton::Right) => match self.cell_at(x, y) {
                Some(id) => BoardAction::ShowDetail(id),
                None => BoardAction::None,
            },
            _ => BoardAction::None,
        }
    }
}

/// Draw the whole board screen
pub fn render_board(frame: &mut Frame, layout: &BoardLayout, core: &AppCore, theme: &BingoTheme) {
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.background.to_color())),
        frame.area(),
    );

    if !layout.fits {
        let message = Paragraph::new(TOO_SMALL_MESSAGE)
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.text_dim.to_color()))
            .wrap(Wrap { trim: true });
        let area = layout.area.intersection(frame.area());
        let middle = Rect::new(area.x, area.y + area.height / 2, area.width, area.height.min(1));
        frame.render_widget(message, middle);
        return;
    }

    render_header(frame, layout.header, core, theme);

    for cell in core.board().grid().cells() {
        if let Some(rect) = layout.cells.get(cell.id) {
            render_cell(frame, *rect, cell, cell.id == core.cursor(), theme);
        }
    }

    render_controls(frame, layout, core, theme);
    render_status(frame, layout.status, core, theme);

    let help = Paragraph::new(
        "←↑↓→ flytta · mellanslag markera · i visa · n ny bricka · c kopiera bild · q avsluta",
    )
    .alignment(Alignment::Center)
    .style(Style::default().fg(theme.text_dim.to_color()));
    frame.render_widget(help, layout.help);
}

fn render_header(frame: &mut Frame, area: Rect, core: &AppCore, theme: &BingoTheme) {
    let board = &core.config.board;
    let lines = vec![
        Line::from(vec![
            Span::styled("★ ", Style::default().fg(theme.pink.to_color())),
            Span::styled(
                board.title.clone(),
                Style::default()
                    .fg(theme.gold.to_color())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" ★", Style::default().fg(theme.pink.to_color())),
        ]),
        Line::from(Span::styled(
            format!("{} · {}", board.subtitle, board.tagline),
            Style::default()
                .fg(theme.pink.to_color())
                .add_modifier(Modifier::ITALIC),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn render_cell(frame: &mut Frame, rect: Rect, cell: &Cell, is_cursor: bool, theme: &BingoTheme) {
    let (fg, bg) = if cell.is_marked {
        (theme.background, theme.gold)
    } else {
        (theme.text, theme.cell_background)
    };
    let border = if is_cursor {
        theme.pink
    } else if cell.is_marked {
        theme.gold
    } else {
        theme.cell_border
    };

    let mut block = Block::bordered()
        .border_type(if is_cursor {
            BorderType::Thick
        } else {
            BorderType::Rounded
        })
        .border_style(Style::default().fg(border.to_color()))
        .style(Style::default().bg(bg.to_color()));
    if cell.text.chars().count() > LONG_TEXT_CHARS {
        block = block.title_bottom(Line::from(" i ").right_aligned());
    }

    let mut style = Style::default().fg(fg.to_color());
    let text = if cell.is_marked {
        style = style.add_modifier(Modifier::BOLD);
        format!("★ {}", cell.text)
    } else {
        cell.text.clone()
    };

    let paragraph = Paragraph::new(text)
        .block(block)
        .style(style)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, rect);
}

fn render_controls(frame: &mut Frame, layout: &BoardLayout, core: &AppCore, theme: &BingoTheme) {
    let new_board = Paragraph::new(NEW_BOARD_LABEL)
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(theme.text.to_color())
                .bg(theme.purple.to_color()),
        );
    frame.render_widget(new_board, layout.new_board_button);

    let status = core.share_status();
    let bg = match status {
        ShareStatus::Idle => theme.pink.to_color(),
        ShareStatus::Generating => theme.text_dim.to_color(),
        ShareStatus::Success => theme.gold.to_color(),
        ShareStatus::Error => Color::Red,
    };
    let export = Paragraph::new(export_label(status))
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(theme.background.to_color())
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(export, layout.export_button);
}

fn render_status(frame: &mut Frame, area: Rect, core: &AppCore, theme: &BingoTheme) {
    let board = core.board();
    let mut spans = vec![Span::styled(
        core.config
            .board
            .footer_text(board.marked_count(), board.grid().cells().len()),
        Style::default().fg(theme.text_dim.to_color()),
    )];

    let lines = board.completed_lines().len();
    if lines > 0 {
        spans.push(Span::raw(" · "));
        spans.push(Span::styled(
            lines_label(lines),
            Style::default().fg(theme.gold.to_color()),
        ));
    }

    // Where the last image went, while the button still shows the result
    if matches!(core.share_status(), ShareStatus::Success | ShareStatus::Error) {
        if let Some(outcome) = core.last_export() {
            let note = match outcome {
                ExportOutcome::Clipboard => "bilden ligger i urklipp".to_string(),
                ExportOutcome::Download { path } => format!("sparad: {}", path.display()),
                ExportOutcome::Failed { reason } => format!("fel: {}", reason),
            };
            spans.push(Span::raw(" · "));
            spans.push(Span::styled(note, Style::default().fg(theme.pink.to_color())));
        }
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::Config;
    use crate::export::testing::{CountingRenderer, RecordingDownload};
    use crate::export::{ExportDriver, ExportPipeline};
    use crate::frontend::tui::overlays::{self, OverlayLayout};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn core() -> AppCore {
        let (tx, _rx) = mpsc::unbounded_channel();
        let pipeline = ExportPipeline::new(
            Box::new(CountingRenderer::default()),
            Box::new(RecordingDownload::default()),
            Duration::ZERO,
            "mello-bingo.png",
        );
        AppCore::new(
            Config::default(),
            Catalog::builtin().unwrap(),
            StdRng::seed_from_u64(7),
            ExportDriver::new(pipeline, Duration::from_secs(3), tx),
        )
        .unwrap()
    }

    /// Draw a frame the way `TuiFrontend::render` does
    fn draw(core: &AppCore, width: u16, height: u16) -> Buffer {
        let theme = BingoTheme::mello();
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                let layout = BoardLayout::compute(area);
                render_board(f, &layout, core, &theme);
                if let Some(overlay) = core.overlay() {
                    let label = overlays::button_label(core, overlay);
                    let layout = OverlayLayout::compute(area, overlay, label);
                    overlays::render_overlay(f, &layout, overlay, core, &theme);
                }
            })
            .unwrap();
        terminal.backend().buffer().clone()
    }

    fn buffer_text(buffer: &Buffer) -> String {
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    fn layout() -> BoardLayout {
        BoardLayout::compute(Rect::new(0, 0, 100, 40))
    }

    fn center(rect: Rect) -> (u16, u16) {
        (rect.x + rect.width / 2, rect.y + rect.height / 2)
    }

    #[test]
    fn test_layout_has_one_rect_per_cell() {
        let layout = layout();
        assert_eq!(layout.cells.len(), 25);
        for rect in &layout.cells {
            assert!(rect.width > 0 && rect.height > 0);
            assert!(rect.y >= layout.header.y + layout.header.height);
            assert!(rect.y + rect.height <= layout.new_board_button.y);
        }
    }

    #[test]
    fn test_cell_hit_testing() {
        let layout = layout();
        for id in [0, 7, 12, 24] {
            let (x, y) = center(layout.cells[id]);
            assert_eq!(layout.cell_at(x, y), Some(id));
        }
        assert_eq!(layout.cell_at(0, 0), None);
    }

    #[test]
    fn test_mouse_buttons_map_to_actions() {
        let layout = layout();
        let (x, y) = center(layout.cells[8]);
        assert_eq!(
            layout.action_at(MouseEventKind::Down(MouseButton::Left), x, y),
            BoardAction::ToggleCell(8)
        );
        assert_eq!(
            layout.action_at(MouseEventKind::Down(MouseButton::Right), x, y),
            BoardAction::ShowDetail(8)
        );
        assert_eq!(
            layout.action_at(MouseEventKind::Up(MouseButton::Left), x, y),
            BoardAction::None
        );

        let (x, y) = center(layout.new_board_button);
        assert_eq!(
            layout.action_at(MouseEventKind::Down(MouseButton::Left), x, y),
            BoardAction::NewBoard
        );
        let (x, y) = center(layout.export_button);
        assert_eq!(
            layout.action_at(MouseEventKind::Down(MouseButton::Left), x, y),
            BoardAction::Export
        );
    }

    #[test]
    fn test_wide_terminal_centers_board() {
        let layout = BoardLayout::compute(Rect::new(0, 0, 200, 40));
        assert_eq!(layout.header.width, MAX_WIDTH);
        assert_eq!(layout.cells[0].x, 45);
    }

    #[test]
    fn test_export_labels() {
        assert_eq!(export_label(ShareStatus::Idle), "Kopiera bild");
        assert_eq!(export_label(ShareStatus::Generating), "Skapar...");
        assert_eq!(export_label(ShareStatus::Success), "Kopierad!");
        assert_eq!(export_label(ShareStatus::Error), "Misslyckades");
    }

    #[test]
    fn test_small_terminals_render_without_panic() {
        let mut core = core();
        for height in 1..=20 {
            draw(&core, 80, height);
        }
        for width in 1..=40 {
            draw(&core, width, 12);
            draw(&core, width, 30);
        }

        core.show_detail(12);
        for height in 1..=20 {
            draw(&core, 80, height);
        }
        for width in 1..=40 {
            draw(&core, width, 12);
            draw(&core, width, 30);
        }
    }

    #[test]
    fn test_too_small_terminal_shows_message() {
        let layout = BoardLayout::compute(Rect::new(0, 0, 80, 12));
        assert!(!layout.fits);
        assert!(layout.cells.is_empty());
        assert_eq!(
            layout.action_at(MouseEventKind::Down(MouseButton::Left), 0, 0),
            BoardAction::None
        );

        let text = buffer_text(&draw(&core(), 80, 12));
        assert!(text.contains(TOO_SMALL_MESSAGE));
    }

    #[test]
    fn test_buttons_stay_inside_frame() {
        for height in MIN_HEIGHT..=20 {
            let area = Rect::new(0, 0, 80, height);
            let layout = BoardLayout::compute(area);
            assert!(layout.fits);
            for button in [layout.new_board_button, layout.export_button] {
                assert_eq!(button.intersection(area), button);
                assert_eq!(button.height, 1);
            }
        }
    }
}
