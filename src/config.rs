//! Configuration loader/writer plus strongly typed settings structures.
//!
//! Settings live in `config.toml` inside the profile directory
//! (`~/.mello-bingo` unless overridden). Defaults are embedded in the binary
//! and extracted on first run, so the file always exists for users to edit.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::Catalog;

// Embed default configuration files at compile time
const DEFAULT_CONFIG: &str = include_str!("../defaults/config.toml");

/// Environment variable that overrides the profile directory
pub const DATA_DIR_ENV: &str = "MELLO_BINGO_DIR";

/// Top-level configuration object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Texts printed on the card and in the exported image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_subtitle")]
    pub subtitle: String,
    #[serde(default = "default_tagline")]
    pub tagline: String,
    /// Footer of the exported image; `{marked}` and `{total}` are substituted
    #[serde(default = "default_footer")]
    pub footer: String,
}

/// Image export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_status_reset_ms")]
    pub status_reset_ms: u64,
    /// Logical canvas width
    #[serde(default = "default_width")]
    pub width: u32,
    /// Logical canvas height
    #[serde(default = "default_height")]
    pub height: u32,
    /// Physical pixels per logical pixel
    #[serde(default = "default_pixel_ratio")]
    pub pixel_ratio: u32,
    /// Hex background color (#RRGGBB)
    #[serde(default = "default_background")]
    pub background: String,
    /// File name used when falling back to a download
    #[serde(default = "default_filename")]
    pub filename: String,
    /// Where downloads land (platform download dir if unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,
    /// Try the system clipboard before writing a file
    #[serde(default = "default_use_clipboard")]
    pub use_clipboard: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Event poll timeout (frame pacing)
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,
}

fn default_title() -> String {
    "Mello Bingo".to_string()
}

fn default_subtitle() -> String {
    "Melodifestivalen".to_string()
}

fn default_tagline() -> String {
    "Nu kör vi!".to_string()
}

fn default_footer() -> String {
    "{marked} av {total} rutor avklarade".to_string()
}

fn default_settle_delay_ms() -> u64 {
    300
}

fn default_status_reset_ms() -> u64 {
    3000
}

fn default_width() -> u32 {
    600
}

fn default_height() -> u32 {
    750
}

fn default_pixel_ratio() -> u32 {
    2
}

fn default_background() -> String {
    "#1a0033".to_string()
}

fn default_filename() -> String {
    "mello-bingo.png".to_string()
}

fn default_use_clipboard() -> bool {
    true
}

fn default_poll_timeout_ms() -> u64 {
    16
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            subtitle: default_subtitle(),
            tagline: default_tagline(),
            footer: default_footer(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            status_reset_ms: default_status_reset_ms(),
            width: default_width(),
            height: default_height(),
            pixel_ratio: default_pixel_ratio(),
            background: default_background(),
            filename: default_filename(),
            download_dir: None,
            use_clipboard: default_use_clipboard(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            poll_timeout_ms: default_poll_timeout_ms(),
        }
    }
}

impl ExportConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn status_reset_delay(&self) -> Duration {
        Duration::from_millis(self.status_reset_ms)
    }

    /// Directory that receives the fallback download
    ///
    /// Falls back to the platform download directory, then the current one.
    pub fn resolved_download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

impl UiConfig {
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms.max(1))
    }
}

impl BoardConfig {
    /// Footer text with counts filled in
    pub fn footer_text(&self, marked: usize, total: usize) -> String {
        self.footer
            .replace("{marked}", &marked.to_string())
            .replace("{total}", &total.to_string())
    }
}

impl Config {
    /// Parse a config from TOML text
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse config")
    }

    /// Load config from the profile directory, writing defaults on first run
    pub fn load(profile_dir: &Path) -> Result<Self> {
        Self::extract_defaults(profile_dir)?;
        Self::load_from_path(&Self::config_path(profile_dir))
    }

    /// Load config from an explicit file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config = Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        if config.export.pixel_ratio == 0 {
            tracing::warn!("export.pixel_ratio is 0, images will be rendered at ratio 1");
        }

        Ok(config)
    }

    /// Write embedded defaults into the profile (idempotent - only creates
    /// missing files)
    pub fn extract_defaults(profile_dir: &Path) -> Result<()> {
        fs::create_dir_all(profile_dir)
            .with_context(|| format!("Failed to create profile directory: {:?}", profile_dir))?;

        let config_path = Self::config_path(profile_dir);
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG).context("Failed to write default config")?;
            tracing::info!("Created default config at {:?}", config_path);
        }

        let catalog_path = profile_dir.join("catalog.toml");
        if !catalog_path.exists() {
            fs::write(&catalog_path, Catalog::default_contents())
                .context("Failed to write default catalog")?;
            tracing::info!("Created default catalog at {:?}", catalog_path);
        }

        Ok(())
    }

    /// Get the base profile directory (~/.mello-bingo/)
    /// Can be overridden with the MELLO_BINGO_DIR environment variable
    pub fn profile_dir() -> Result<PathBuf> {
        if let Ok(custom_dir) = std::env::var(DATA_DIR_ENV) {
            return Ok(PathBuf::from(custom_dir));
        }

        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".mello-bingo"))
    }

    /// Get path to config.toml inside a profile directory
    pub fn config_path(profile_dir: &Path) -> PathBuf {
        profile_dir.join("config.toml")
    }
}
