//! Fixed-layout rendering of the board
//!
//! The card is laid out as an SVG document in logical pixels (600x750 by
//! default): title, subtitle between two sparkles, the 5x5 grid, and a footer
//! with the marked count. resvg rasterizes it at the pixel ratio.

use super::{BoardRenderer, BoardSnapshot, ExportError, RenderedBoard};
use crate::config::ExportConfig;
use crate::core::board::GRID_SIZE;
use crate::theme::BingoTheme;
use image::{ImageFormat, RgbaImage};
use resvg::{tiny_skia, usvg};
use std::fmt::Write as _;
use std::io::Cursor;
use std::sync::{Arc, OnceLock};

const PADDING: f32 = 48.0;
const TITLE_SIZE: f32 = 60.0;
const TITLE_GAP: f32 = 8.0;
const SUBTITLE_SIZE: f32 = 14.0;
const GRID_TOP_GAP: f32 = 32.0;
const CELL_GAP: f32 = 12.0;
const CELL_RADIUS: f32 = 12.0;
const CELL_PADDING: f32 = 8.0;
const FOOTER_GAP: f32 = 40.0;
const FOOTER_SIZE: f32 = 12.0;
const STAR_SIZE: f32 = 6.0;

/// Cell font sizes, largest first
const CELL_FONT_SIZES: [f32; 5] = [12.0, 11.0, 10.0, 9.0, 8.0];
const LINE_HEIGHT: f32 = 1.25;
/// Average advance of a bold sans glyph, in ems
const GLYPH_WIDTH: f32 = 0.58;

const FONT_FAMILY: &str = "Inter, Segoe UI, DejaVu Sans, Liberation Sans, sans-serif";

/// Physical canvas limit; anything bigger is a misconfiguration
const MAX_PIXELS: u64 = 64 * 1024 * 1024;

/// System fonts, loaded on first render
fn system_fonts() -> Arc<usvg::fontdb::Database> {
    static FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut fontdb = usvg::fontdb::Database::new();
            fontdb.load_system_fonts();
            tracing::debug!("Loaded {} font faces for export", fontdb.len());
            Arc::new(fontdb)
        })
        .clone()
}

/// Renders snapshots to PNG with the Mello look
#[derive(Debug, Clone)]
pub struct PngRenderer {
    theme: BingoTheme,
    width: u32,
    height: u32,
    pixel_ratio: u32,
}

impl PngRenderer {
    pub fn new(theme: BingoTheme, width: u32, height: u32, pixel_ratio: u32) -> Self {
        Self {
            theme,
            width,
            height,
            pixel_ratio: pixel_ratio.max(1),
        }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(
            BingoTheme::mello().with_background(&config.background),
            config.width,
            config.height,
            config.pixel_ratio,
        )
    }

    fn physical_size(&self) -> Result<(u32, u32), ExportError> {
        let width = self.width as u64 * self.pixel_ratio as u64;
        let height = self.height as u64 * self.pixel_ratio as u64;
        if width == 0 || height == 0 {
            return Err(ExportError::Render("canvas has zero size".to_string()));
        }
        if width * height > MAX_PIXELS {
            return Err(ExportError::Render(format!(
                "canvas {}x{} is too large",
                width, height
            )));
        }
        Ok((width as u32, height as u32))
    }

    /// Lay the card out as an SVG document in logical pixels
    fn svg(&self, snapshot: &BoardSnapshot) -> String {
        let theme = &self.theme;
        let width = self.width as f32;
        let height = self.height as f32;
        let center = width / 2.0;
        let mut svg = String::new();

        let _ = writeln!(
            svg,
            "<svg xmlns='http://www.w3.org/2000/svg' width='{w}' height='{h}' viewBox='0 0 {w} {h}'>",
            w = self.width,
            h = self.height
        );
        let _ = writeln!(
            svg,
            "<defs>\
             <radialGradient id='glow-pink'><stop offset='0' stop-color='{pink}' stop-opacity='0.3'/><stop offset='1' stop-color='{pink}' stop-opacity='0'/></radialGradient>\
             <radialGradient id='glow-purple'><stop offset='0' stop-color='{purple}' stop-opacity='0.3'/><stop offset='1' stop-color='{purple}' stop-opacity='0'/></radialGradient>\
             </defs>",
            pink = theme.pink.hex(),
            purple = theme.purple.hex()
        );

        // Festive background
        let _ = writeln!(
            svg,
            "<rect width='{}' height='{}' fill='{}'/>",
            self.width,
            self.height,
            theme.background.hex()
        );
        let glow = width * 0.55;
        let _ = writeln!(
            svg,
            "<circle cx='{:.1}' cy='{:.1}' r='{:.1}' fill='url(#glow-pink)'/>",
            width * 0.2,
            height * 0.2,
            glow
        );
        let _ = writeln!(
            svg,
            "<circle cx='{:.1}' cy='{:.1}' r='{:.1}' fill='url(#glow-purple)'/>",
            width * 0.8,
            height * 0.8,
            glow
        );

        // Title
        let mut y = PADDING;
        let _ = writeln!(
            svg,
            "<text x='{center:.1}' y='{:.1}' font-family='{FONT_FAMILY}' font-size='{TITLE_SIZE}' font-weight='900' font-style='italic' letter-spacing='-1.5' text-anchor='middle' fill='{}'>{}</text>",
            y + TITLE_SIZE * 0.85,
            theme.gold.hex(),
            escape_text(&snapshot.title.to_uppercase())
        );
        y += TITLE_SIZE + TITLE_GAP;

        // Subtitle with a sparkle on each side
        let subtitle = snapshot.subtitle.to_uppercase();
        let tracking = SUBTITLE_SIZE * 0.3;
        let subtitle_width =
            estimate_width(&subtitle, SUBTITLE_SIZE) + tracking * subtitle.chars().count() as f32;
        let baseline = y + SUBTITLE_SIZE * 0.85;
        let _ = writeln!(
            svg,
            "<text x='{center:.1}' y='{baseline:.1}' font-family='{FONT_FAMILY}' font-size='{SUBTITLE_SIZE}' font-weight='500' letter-spacing='{tracking:.1}' text-anchor='middle' fill='{}' fill-opacity='0.6'>{}</text>",
            theme.text.hex(),
            escape_text(&subtitle)
        );
        let sparkle_y = y + SUBTITLE_SIZE / 2.0;
        for sparkle_x in [
            center - subtitle_width / 2.0 - 14.0,
            center + subtitle_width / 2.0 + 14.0,
        ] {
            let _ = writeln!(
                svg,
                "<polygon points='{}' fill='{}' fill-opacity='0.6'/>",
                star_points(sparkle_x, sparkle_y, 5.0, 1.5, 4),
                theme.text.hex()
            );
        }
        y += SUBTITLE_SIZE + GRID_TOP_GAP;

        // Grid
        let grid_width = width - 2.0 * PADDING;
        let cell_size = cell_size(grid_width);
        for (index, cell) in snapshot.cells.iter().enumerate() {
            let row = index / GRID_SIZE;
            let col = index % GRID_SIZE;
            let x = PADDING + col as f32 * (cell_size + CELL_GAP);
            let cell_y = y + row as f32 * (cell_size + CELL_GAP);
            self.write_cell(&mut svg, x, cell_y, cell_size, &cell.text, cell.is_marked);
        }
        y += grid_width + FOOTER_GAP;

        // Footer
        if y + FOOTER_SIZE <= height {
            let _ = writeln!(
                svg,
                "<text x='{center:.1}' y='{:.1}' font-family='{FONT_FAMILY}' font-size='{FOOTER_SIZE}' font-weight='500' letter-spacing='2.4' text-anchor='middle' fill='{}' fill-opacity='0.4'>{}</text>",
                y + FOOTER_SIZE * 0.85,
                theme.text.hex(),
                escape_text(&snapshot.footer.to_uppercase())
            );
        }

        svg.push_str("</svg>\n");
        svg
    }

    fn write_cell(&self, svg: &mut String, x: f32, y: f32, size: f32, text: &str, marked: bool) {
        let theme = &self.theme;
        if marked {
            let _ = writeln!(
                svg,
                "<rect x='{x:.1}' y='{y:.1}' width='{size:.1}' height='{size:.1}' rx='{CELL_RADIUS}' fill='{gold}' stroke='{gold}' stroke-width='1'/>",
                gold = theme.gold.hex()
            );
            let _ = writeln!(
                svg,
                "<polygon points='{}' fill='{}'/>",
                star_points(x + size - STAR_SIZE - 4.0, y + STAR_SIZE + 4.0, STAR_SIZE, STAR_SIZE * 0.4, 5),
                theme.background.hex()
            );
        } else {
            let _ = writeln!(
                svg,
                "<rect x='{x:.1}' y='{y:.1}' width='{size:.1}' height='{size:.1}' rx='{CELL_RADIUS}' fill='#ffffff' fill-opacity='0.1' stroke='#ffffff' stroke-opacity='0.2' stroke-width='1'/>"
            );
        }

        let inner = size - 2.0 * CELL_PADDING;
        let (font_size, lines) = fit_text(text, inner, inner);
        let line_height = font_size * LINE_HEIGHT;
        let block_height = lines.len() as f32 * line_height;
        let top = y + CELL_PADDING + ((inner - block_height) / 2.0).max(0.0);
        let (fill, opacity) = if marked {
            (theme.background.hex(), 1.0)
        } else {
            (theme.text.hex(), 0.9)
        };

        let _ = write!(
            svg,
            "<text font-family='{FONT_FAMILY}' font-size='{font_size}' font-weight='700' text-anchor='middle' fill='{fill}' fill-opacity='{opacity}'>"
        );
        for (index, line) in lines.iter().enumerate() {
            let baseline = top + index as f32 * line_height + font_size;
            let _ = write!(
                svg,
                "<tspan x='{:.1}' y='{baseline:.1}'>{}</tspan>",
                x + size / 2.0,
                escape_text(line)
            );
        }
        svg.push_str("</text>\n");
    }

    fn rasterize(&self, svg: &str) -> Result<tiny_skia::Pixmap, ExportError> {
        let (width, height) = self.physical_size()?;

        let mut options = usvg::Options::default();
        options.fontdb = system_fonts();
        let tree = usvg::Tree::from_data(svg.as_bytes(), &options)
            .map_err(|err| ExportError::Render(format!("SVG parse failed: {err}")))?;

        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| ExportError::Render("pixmap allocation failed".to_string()))?;
        let scale = self.pixel_ratio as f32;
        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );
        Ok(pixmap)
    }
}

fn cell_size(grid_width: f32) -> f32 {
    (grid_width - CELL_GAP * (GRID_SIZE - 1) as f32) / GRID_SIZE as f32
}

fn estimate_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * GLYPH_WIDTH
}

/// Outline of a star with `points` tips, as an SVG `points` list
fn star_points(cx: f32, cy: f32, outer: f32, inner: f32, points: usize) -> String {
    let mut out = String::new();
    for i in 0..points * 2 {
        let radius = if i % 2 == 0 { outer } else { inner };
        let angle = std::f32::consts::PI * i as f32 / points as f32 - std::f32::consts::FRAC_PI_2;
        let _ = write!(
            out,
            "{:.2},{:.2} ",
            cx + radius * angle.cos(),
            cy + radius * angle.sin()
        );
    }
    out.trim_end().to_string()
}

fn escape_text(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Pick the largest font size at which `text` fits the box
///
/// Prefers sizes where no word needs to be split. At the smallest size words
/// are split and overflowing lines are dropped with a trailing "...".
fn fit_text(text: &str, max_width: f32, max_height: f32) -> (f32, Vec<String>) {
    for font_size in CELL_FONT_SIZES {
        let max_chars = (max_width / (font_size * GLYPH_WIDTH)).floor() as usize;
        let max_lines = (max_height / (font_size * LINE_HEIGHT)).floor() as usize;
        if max_chars == 0 {
            continue;
        }

        let lines = textwrap::wrap(text, textwrap::Options::new(max_chars).break_words(false));
        let overflows = lines.iter().any(|line| line.chars().count() > max_chars);
        if !overflows && lines.len() <= max_lines {
            return (font_size, lines.into_iter().map(|line| line.into_owned()).collect());
        }
    }

    let font_size = CELL_FONT_SIZES[CELL_FONT_SIZES.len() - 1];
    let max_chars = ((max_width / (font_size * GLYPH_WIDTH)).floor() as usize).max(1);
    let max_lines = ((max_height / (font_size * LINE_HEIGHT)).floor() as usize).max(1);
    let mut lines: Vec<String> = textwrap::wrap(text, textwrap::Options::new(max_chars))
        .into_iter()
        .map(|line| line.into_owned())
        .collect();
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            let keep = max_chars.saturating_sub(3);
            *last = last.chars().take(keep).collect::<String>() + "...";
        }
    }
    (font_size, lines)
}

impl BoardRenderer for PngRenderer {
    fn render(&self, snapshot: &BoardSnapshot) -> Result<RenderedBoard, ExportError> {
        let svg = self.svg(snapshot);
        let pixmap = self.rasterize(&svg)?;
        let (width, height) = (pixmap.width(), pixmap.height());

        // tiny-skia stores premultiplied alpha
        let rgba: Vec<u8> = pixmap
            .pixels()
            .iter()
            .flat_map(|pixel| {
                let color = pixel.demultiply();
                [color.red(), color.green(), color.blue(), color.alpha()]
            })
            .collect();

        let image = RgbaImage::from_raw(width, height, rgba)
            .ok_or_else(|| ExportError::Render("pixel buffer size mismatch".to_string()))?;
        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        tracing::debug!(
            "Rendered board image {}x{} ({} bytes PNG)",
            width,
            height,
            png.len()
        );

        Ok(RenderedBoard {
            width,
            height,
            rgba: image.into_raw(),
            png,
        })
    }
}
