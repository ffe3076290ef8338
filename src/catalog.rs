//! Prompt catalog - the pool of texts a bingo card is drawn from
//!
//! The default catalog is embedded at compile time. A `catalog.toml` in the
//! profile directory replaces it wholesale.

use crate::core::board::{BoardError, GRID_CELLS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const DEFAULT_CATALOG: &str = include_str!("../defaults/catalog.toml");

/// Ordered list of candidate cell texts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub prompts: Vec<String>,
}

impl Catalog {
    /// The built-in Melodifestivalen catalog
    pub fn builtin() -> Result<Self> {
        Self::parse(DEFAULT_CATALOG).context("Embedded default catalog is invalid")
    }

    /// Parse a catalog from TOML text
    pub fn parse(contents: &str) -> Result<Self> {
        let catalog: Catalog = toml::from_str(contents).context("Failed to parse catalog")?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load and validate a catalog file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {:?}", path))?;
        Self::parse(&contents).with_context(|| format!("Invalid catalog: {:?}", path))
    }

    /// Load `catalog.toml` from the profile directory, falling back to the
    /// built-in catalog when the file does not exist
    pub fn load(profile_dir: &Path) -> Result<Self> {
        let path = profile_dir.join("catalog.toml");
        if path.exists() {
            tracing::info!("Loading catalog from {:?}", path);
            Self::load_from_file(&path)
        } else {
            tracing::debug!("No catalog at {:?}, using built-in prompts", path);
            Self::builtin()
        }
    }

    /// Raw text of the built-in catalog (written to the profile on first run)
    pub fn default_contents() -> &'static str {
        DEFAULT_CATALOG
    }

    /// Check the data contract the board generator relies on
    ///
    /// A grid needs 25 pairwise-distinct, non-empty prompts. Violations are
    /// configuration errors and should stop the program at startup.
    pub fn validate(&self) -> Result<(), BoardError> {
        let mut seen = HashSet::new();
        for (index, prompt) in self.prompts.iter().enumerate() {
            if prompt.trim().is_empty() {
                return Err(BoardError::EmptyPrompt { index });
            }
            if !seen.insert(prompt.as_str()) {
                return Err(BoardError::DuplicatePrompt(prompt.clone()));
            }
        }

        if self.prompts.len() < GRID_CELLS {
            return Err(BoardError::CatalogTooSmall {
                found: self.prompts.len(),
                required: GRID_CELLS,
            });
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}
