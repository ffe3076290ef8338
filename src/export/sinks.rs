//! Delivery targets for a rendered board

use super::{ExportError, RenderedBoard};
use std::fs;
use std::path::PathBuf;

/// Receives the image as pixels (path A)
pub trait ClipboardSink: Send + Sync {
    fn copy_image(&self, image: &RenderedBoard) -> Result<(), ExportError>;
}

/// Receives the image as a named PNG file (path B)
pub trait DownloadSink: Send + Sync {
    /// Store the PNG and return where it ended up
    fn save(&self, filename: &str, png: &[u8]) -> Result<PathBuf, ExportError>;
}

/// Writes downloads into a directory, replacing any earlier export
#[derive(Debug, Clone)]
pub struct FileDownload {
    dir: PathBuf,
}

impl FileDownload {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadSink for FileDownload {
    fn save(&self, filename: &str, png: &[u8]) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        fs::write(&path, png)?;
        tracing::info!("Saved board image to {:?} ({} bytes)", path, png.len());
        Ok(path)
    }
}
