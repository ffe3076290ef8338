//! Board image export
//!
//! Turns a snapshot of the board into a PNG and hands it to the user: the
//! system clipboard first, a file in the download directory if that fails.
//! The `driver` runs exports as background tasks and owns the share status.

pub mod driver;
pub mod render;
pub mod sinks;
pub mod status;

pub use driver::{ExportDriver, ExportEvent};
pub use render::PngRenderer;
pub use sinks::{ClipboardSink, DownloadSink, FileDownload};
pub use status::{ShareStatus, ShareTracker};

use crate::config::{BoardConfig, ExportConfig};
use crate::core::board::Grid;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Failures inside the export pipeline
///
/// None of these reach the frontend; the pipeline downgrades them to
/// `ExportOutcome::Failed` and the share status shows an error.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to render board image: {0}")]
    Render(String),

    #[error("failed to encode board image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("failed to save board image: {0}")]
    Download(#[from] std::io::Error),
}

/// How an export attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Image is on the system clipboard
    Clipboard,
    /// Image was written to disk
    Download { path: PathBuf },
    /// Rendering failed, or both delivery paths failed
    Failed { reason: String },
}

impl ExportOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, ExportOutcome::Failed { .. })
    }
}

/// One cell as it appears in the exported image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSnapshot {
    pub text: String,
    pub is_marked: bool,
}

/// Everything the renderer needs, detached from the live board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub title: String,
    pub subtitle: String,
    pub footer: String,
    pub cells: Vec<CellSnapshot>,
}

impl BoardSnapshot {
    pub fn capture(grid: &Grid, board: &BoardConfig) -> Self {
        let cells: Vec<CellSnapshot> = grid
            .cells()
            .iter()
            .map(|cell| CellSnapshot {
                text: cell.text.clone(),
                is_marked: cell.is_marked,
            })
            .collect();

        Self {
            title: board.title.clone(),
            subtitle: board.subtitle.clone(),
            footer: board.footer_text(grid.marked_count(), cells.len()),
            cells,
        }
    }

    pub fn marked_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_marked).count()
    }
}

/// Rendered image in both forms the sinks need
#[derive(Debug, Clone)]
pub struct RenderedBoard {
    pub width: u32,
    pub height: u32,
    /// Raw RGBA8 pixels, row-major
    pub rgba: Vec<u8>,
    /// PNG encoding of the same pixels
    pub png: Vec<u8>,
}

/// Rasterizes a snapshot
pub trait BoardRenderer: Send + Sync {
    fn render(&self, snapshot: &BoardSnapshot) -> Result<RenderedBoard, ExportError>;
}

/// Settle delay, render, then clipboard-or-download
///
/// Exports cannot be cancelled once started; the pipeline always runs to an
/// `ExportOutcome`. Rendering and delivery run on tokio's blocking pool.
pub struct ExportPipeline {
    renderer: Arc<dyn BoardRenderer>,
    clipboard: Option<Arc<dyn ClipboardSink>>,
    download: Arc<dyn DownloadSink>,
    settle_delay: Duration,
    filename: String,
}

impl ExportPipeline {
    pub fn new(
        renderer: Box<dyn BoardRenderer>,
        download: Box<dyn DownloadSink>,
        settle_delay: Duration,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            renderer: Arc::from(renderer),
            clipboard: None,
            download: Arc::from(download),
            settle_delay,
            filename: filename.into(),
        }
    }

    /// Try this clipboard before falling back to the download sink
    pub fn with_clipboard(mut self, clipboard: Box<dyn ClipboardSink>) -> Self {
        self.clipboard = Some(Arc::from(clipboard));
        self
    }

    /// Pipeline wired to the real renderer, system clipboard and file system
    pub fn from_config(config: &ExportConfig) -> Self {
        let pipeline = Self::new(
            Box::new(PngRenderer::from_config(config)),
            Box::new(FileDownload::new(config.resolved_download_dir())),
            config.settle_delay(),
            config.filename.clone(),
        );

        if config.use_clipboard {
            pipeline.with_clipboard(Box::new(crate::clipboard::SystemClipboard::new()))
        } else {
            pipeline
        }
    }

    /// Run one export to completion
    pub async fn export(&self, snapshot: BoardSnapshot) -> ExportOutcome {
        match self.render_and_deliver(snapshot).await {
            Ok(outcome) => {
                tracing::info!("Board exported: {:?}", outcome);
                outcome
            }
            Err(e) => {
                tracing::error!("Error exporting board: {}", e);
                ExportOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn render_and_deliver(
        &self,
        snapshot: BoardSnapshot,
    ) -> Result<ExportOutcome, ExportError> {
        // Let the last toggle land before taking the picture
        tokio::time::sleep(self.settle_delay).await;

        let renderer = Arc::clone(&self.renderer);
        let clipboard = self.clipboard.clone();
        let download = Arc::clone(&self.download);
        let filename = self.filename.clone();

        tokio::task::spawn_blocking(move || {
            let image = renderer.render(&snapshot)?;
            deliver(&image, clipboard.as_deref(), download.as_ref(), &filename)
        })
        .await
        .map_err(|e| ExportError::Render(format!("export task failed: {}", e)))?
    }
}

/// Clipboard first, download sink as the fallback
fn deliver(
    image: &RenderedBoard,
    clipboard: Option<&dyn ClipboardSink>,
    download: &dyn DownloadSink,
    filename: &str,
) -> Result<ExportOutcome, ExportError> {
    match clipboard {
        Some(clipboard) => match clipboard.copy_image(image) {
            Ok(()) => return Ok(ExportOutcome::Clipboard),
            Err(e) => {
                tracing::warn!("Clipboard copy failed, falling back to download: {}", e)
            }
        },
        None => tracing::debug!("No clipboard configured, saving image to disk"),
    }

    let path = download.save(filename, &image.png)?;
    Ok(ExportOutcome::Download { path })
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use std::sync::atomic::Ordering;

    fn pipeline(
        renderer: CountingRenderer,
        clipboard: Option<ScriptedClipboard>,
        download: RecordingDownload,
    ) -> ExportPipeline {
        let pipeline = ExportPipeline::new(
            Box::new(renderer),
            Box::new(download),
            Duration::from_millis(300),
            "mello-bingo.png",
        );
        match clipboard {
            Some(clipboard) => pipeline.with_clipboard(Box::new(clipboard)),
            None => pipeline,
        }
    }

    #[test]
    fn test_snapshot_capture() {
        let mut grid = Grid::from_texts((0..25).map(|i| format!("Cell {}", i))).unwrap();
        grid.toggle(3).unwrap();
        grid.toggle(20).unwrap();

        let snapshot = BoardSnapshot::capture(&grid, &BoardConfig::default());
        assert_eq!(snapshot.cells.len(), 25);
        assert_eq!(snapshot.marked_count(), 2);
        assert_eq!(snapshot.footer, "2 av 25 rutor avklarade");
        assert!(snapshot.cells[3].is_marked);
        assert_eq!(snapshot.cells[20].text, "Cell 20");
    }

    #[tokio::test(start_paused = true)]
    async fn test_clipboard_success() {
        let clipboard = ScriptedClipboard::default();
        let download = RecordingDownload::default();
        let pipeline = pipeline(
            CountingRenderer::default(),
            Some(clipboard.clone()),
            download.clone(),
        );

        let outcome = pipeline.export(snapshot()).await;
        assert_eq!(outcome, ExportOutcome::Clipboard);
        assert_eq!(clipboard.copies.load(Ordering::SeqCst), 1);
        assert!(download.saved.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clipboard_failure_falls_back_to_download() {
        let download = RecordingDownload::default();
        let pipeline = pipeline(
            CountingRenderer::default(),
            Some(ScriptedClipboard {
                fail: true,
                ..Default::default()
            }),
            download.clone(),
        );

        let outcome = pipeline.export(snapshot()).await;
        assert_eq!(
            outcome,
            ExportOutcome::Download {
                path: PathBuf::from("/downloads/mello-bingo.png")
            }
        );
        let saved = download.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0, "mello-bingo.png");
        assert_eq!(saved[0].1, b"png:2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_clipboard_goes_straight_to_download() {
        let download = RecordingDownload::default();
        let pipeline = pipeline(CountingRenderer::default(), None, download.clone());

        assert!(matches!(
            pipeline.export(snapshot()).await,
            ExportOutcome::Download { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_failure_skips_delivery() {
        let clipboard = ScriptedClipboard::default();
        let download = RecordingDownload::default();
        let pipeline = pipeline(
            CountingRenderer {
                fail: true,
                ..Default::default()
            },
            Some(clipboard.clone()),
            download.clone(),
        );

        let outcome = pipeline.export(snapshot()).await;
        assert!(matches!(outcome, ExportOutcome::Failed { .. }));
        assert_eq!(clipboard.copies.load(Ordering::SeqCst), 0);
        assert!(download.saved.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_both_delivery_paths_failing_is_error() {
        let pipeline = pipeline(
            CountingRenderer::default(),
            Some(ScriptedClipboard {
                fail: true,
                ..Default::default()
            }),
            RecordingDownload {
                fail: true,
                ..Default::default()
            },
        );

        match pipeline.export(snapshot()).await {
            ExportOutcome::Failed { reason } => assert!(reason.contains("read-only")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_delay_before_render() {
        let renderer = CountingRenderer::default();
        let pipeline = pipeline(renderer.clone(), None, RecordingDownload::default());

        let start = tokio::time::Instant::now();
        let _ = pipeline.export(snapshot()).await;
        assert!(start.elapsed() >= Duration::from_millis(300));
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_render_does_not_block_the_runtime() {
        // A render running inline would hold the only runtime thread, and
        // the gate below could never be opened
        let (started_tx, mut started) = tokio::sync::mpsc::unbounded_channel();
        let (open, gate) = std::sync::mpsc::channel();
        let pipeline = ExportPipeline::new(
            Box::new(GatedRenderer {
                started: started_tx,
                gate: std::sync::Mutex::new(gate),
            }),
            Box::new(RecordingDownload::default()),
            Duration::ZERO,
            "mello-bingo.png",
        );

        let export = tokio::spawn(async move { pipeline.export(snapshot()).await });
        started.recv().await.unwrap();
        open.send(()).unwrap();

        assert!(matches!(
            export.await.unwrap(),
            ExportOutcome::Download { .. }
        ));
    }
}
