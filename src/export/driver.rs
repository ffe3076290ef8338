//! Runs exports in the background and feeds results back to the main loop
//!
//! The driver owns the share status. Export work and the status-reset timer
//! run as tokio tasks that only talk back through an mpsc channel, so every
//! status change still happens on the loop that owns the driver.

use super::{BoardSnapshot, ExportOutcome, ExportPipeline, ShareStatus, ShareTracker};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Messages from background export tasks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportEvent {
    /// An export ran to completion
    Finished(ExportOutcome),
    /// The status-reset timer fired
    ResetStatus,
}

pub struct ExportDriver {
    pipeline: Arc<ExportPipeline>,
    tracker: ShareTracker,
    reset_delay: Duration,
    events: mpsc::UnboundedSender<ExportEvent>,
}

impl ExportDriver {
    pub fn new(
        pipeline: ExportPipeline,
        reset_delay: Duration,
        events: mpsc::UnboundedSender<ExportEvent>,
    ) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            tracker: ShareTracker::new(),
            reset_delay,
            events,
        }
    }

    pub fn status(&self) -> ShareStatus {
        self.tracker.status()
    }

    pub fn last_outcome(&self) -> Option<&ExportOutcome> {
        self.tracker.last_outcome()
    }

    /// Start exporting `snapshot` unless an export is already generating
    ///
    /// Must be called from within a tokio runtime. Returns whether a new
    /// export was started.
    pub fn request(&mut self, snapshot: BoardSnapshot) -> bool {
        if !self.tracker.begin_export() {
            tracing::debug!("Export already in progress, ignoring request");
            return false;
        }

        tracing::info!("Starting board export ({} marked)", snapshot.marked_count());
        let pipeline = Arc::clone(&self.pipeline);
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = pipeline.export(snapshot).await;
            if events.send(ExportEvent::Finished(outcome)).is_err() {
                tracing::debug!("Export finished after the main loop went away");
            }
        });
        true
    }

    /// Apply an event produced by a background task
    pub fn handle_event(&mut self, event: ExportEvent) {
        match event {
            ExportEvent::Finished(outcome) => {
                let status = self.tracker.complete_export(outcome);
                tracing::debug!("Share status -> {}", status);
                self.schedule_reset();
            }
            ExportEvent::ResetStatus => {
                if self.tracker.reset() {
                    tracing::debug!("Share status -> idle");
                }
            }
        }
    }

    /// Return to idle after the reset delay, whatever happens in between
    fn schedule_reset(&self) {
        let events = self.events.clone();
        let delay = self.reset_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(ExportEvent::ResetStatus);
        });
    }
}
