//! Mello color palette
//!
//! One palette feeds both the terminal frontend (ratatui colors) and the SVG
//! card behind the PNG export, so the shared image looks like the board on screen.

use ratatui::style::Color;

/// Plain 8-bit RGB triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#RRGGBB` (leading `#` optional)
    pub fn parse_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self(r, g, b))
    }

    pub fn to_color(self) -> Color {
        Color::Rgb(self.0, self.1, self.2)
    }

    /// `#rrggbb`, as SVG paint
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Colors used for the card
#[derive(Debug, Clone)]
pub struct BingoTheme {
    pub background: Rgb,
    pub gold: Rgb,
    pub pink: Rgb,
    pub purple: Rgb,
    pub text: Rgb,
    pub text_dim: Rgb,
    pub cell_background: Rgb,
    pub cell_border: Rgb,
}

impl BingoTheme {
    pub fn mello() -> Self {
        Self {
            background: Rgb(0x1a, 0x00, 0x33),
            gold: Rgb(0xff, 0xd7, 0x00),
            pink: Rgb(0xff, 0x2e, 0x93),
            purple: Rgb(0x6b, 0x2f, 0xb3),
            text: Rgb(0xf2, 0xf2, 0xf2),
            text_dim: Rgb(0x99, 0x8c, 0xa6),
            cell_background: Rgb(0x31, 0x1a, 0x47),
            cell_border: Rgb(0x48, 0x33, 0x5c),
        }
    }

    /// Mello palette with the background replaced by a configured hex color
    ///
    /// Unparseable colors are logged and ignored.
    pub fn with_background(mut self, hex: &str) -> Self {
        match Rgb::parse_hex(hex) {
            Some(color) => self.background = color,
            None => tracing::warn!("Ignoring invalid background color {:?}", hex),
        }
        self
    }
}

impl Default for BingoTheme {
    fn default() -> Self {
        Self::mello()
    }
}
