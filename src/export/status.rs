//! Share status state machine
//!
//! `Idle -> Generating -> Success | Error -> Idle`. Only one export may be
//! generating at a time; the reset back to idle is driven by a timer.

use super::ExportOutcome;
use std::fmt;

/// Lifecycle of an export attempt as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShareStatus {
    #[default]
    Idle,
    Generating,
    Success,
    Error,
}

impl fmt::Display for ShareStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShareStatus::Idle => "idle",
            ShareStatus::Generating => "generating",
            ShareStatus::Success => "success",
            ShareStatus::Error => "error",
        };
        f.write_str(name)
    }
}

/// Holds the share status plus the outcome of the last finished export
#[derive(Debug, Clone, Default)]
pub struct ShareTracker {
    status: ShareStatus,
    last_outcome: Option<ExportOutcome>,
}

impl ShareTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> ShareStatus {
        self.status
    }

    pub fn last_outcome(&self) -> Option<&ExportOutcome> {
        self.last_outcome.as_ref()
    }

    /// Enter `Generating`; returns false (and changes nothing) if an export
    /// is already running
    pub fn begin_export(&mut self) -> bool {
        if self.status == ShareStatus::Generating {
            return false;
        }
        self.status = ShareStatus::Generating;
        true
    }

    /// Record a finished export and move to `Success` or `Error`
    pub fn complete_export(&mut self, outcome: ExportOutcome) -> ShareStatus {
        if self.status != ShareStatus::Generating {
            tracing::warn!(
                "Export finished while status was {}, recording it anyway",
                self.status
            );
        }
        self.status = if outcome.is_success() {
            ShareStatus::Success
        } else {
            ShareStatus::Error
        };
        self.last_outcome = Some(outcome);
        self.status
    }

    /// Timer-driven return to `Idle`
    ///
    /// Only leaves `Success`/`Error`; a reset that fires while a newer export
    /// is generating is ignored. Returns true if the status changed.
    pub fn reset(&mut self) -> bool {
        match self.status {
            ShareStatus::Success | ShareStatus::Error => {
                self.status = ShareStatus::Idle;
                true
            }
            ShareStatus::Idle | ShareStatus::Generating => false,
        }
    }
}
