//! Clipboard integration for board images
//!
//! Uses arboard for cross-platform clipboard access

use crate::export::{ClipboardSink, ExportError, RenderedBoard};
use arboard::{Clipboard, ImageData};
use std::borrow::Cow;
use std::sync::Mutex;

/// The system clipboard
///
/// On X11 and Wayland the copied image is served by whoever owns the
/// clipboard, so the arboard handle is opened on first copy and kept for the
/// rest of the session. Headless sessions (no display, no clipboard manager)
/// fail to open it and the exporter falls back to a file.
#[derive(Default)]
pub struct SystemClipboard {
    clipboard: Mutex<Option<Clipboard>>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy RGBA pixels to the system clipboard as an image
    pub fn copy_image(&self, width: u32, height: u32, rgba: &[u8]) -> Result<(), ExportError> {
        check_buffer(width, height, rgba)?;

        let mut slot = self
            .clipboard
            .lock()
            .map_err(|_| ExportError::Clipboard("clipboard lock poisoned".to_string()))?;
        if slot.is_none() {
            *slot = Some(Clipboard::new().map_err(|e| ExportError::Clipboard(e.to_string()))?);
            tracing::debug!("Opened system clipboard");
        }

        if let Some(clipboard) = slot.as_mut() {
            clipboard
                .set_image(ImageData {
                    width: width as usize,
                    height: height as usize,
                    bytes: Cow::Borrowed(rgba),
                })
                .map_err(|e| ExportError::Clipboard(e.to_string()))?;
        }

        tracing::debug!("Copied {}x{} image to clipboard", width, height);
        Ok(())
    }

    #[cfg(test)]
    fn is_open(&self) -> bool {
        self.clipboard
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }
}

fn check_buffer(width: u32, height: u32, rgba: &[u8]) -> Result<(), ExportError> {
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(ExportError::Clipboard(format!(
            "image buffer is {} bytes, expected {}",
            rgba.len(),
            expected
        )));
    }
    Ok(())
}

impl ClipboardSink for SystemClipboard {
    fn copy_image(&self, image: &RenderedBoard) -> Result<(), ExportError> {
        SystemClipboard::copy_image(self, image.width, image.height, &image.rgba)
    }
}
