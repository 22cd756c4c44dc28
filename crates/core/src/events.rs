//! Notification events
//!
//! Subscribers observe two kinds of events: content updates and export
//! progress. Both are delivered on a single dedicated notification thread,
//! never on the thread that holds the table lock.

use serde::{Deserialize, Serialize};

/// Progress value emitted once an export has completed successfully.
pub const PROGRESS_DONE: f64 = 1.0;

/// Terminal progress value for a failed or cancelled export.
pub const PROGRESS_FAILED: f64 = -1.0;

/// An observable table notification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TableEvent {
    /// The table's contents changed (insert, append, remove or clear).
    ///
    /// Carries no payload; a batched `append` fires exactly one of these
    /// for the whole batch.
    Updated,

    /// Export progress, in `[0, 1]` while the build runs.
    ///
    /// [`PROGRESS_DONE`] signals a successful export; [`PROGRESS_FAILED`]
    /// is the terminal value for any failure or cancellation.
    ExportProgress(f64),
}

impl TableEvent {
    /// Check if this event is the terminal failure signal for an export.
    pub fn is_export_failure(&self) -> bool {
        matches!(self, TableEvent::ExportProgress(p) if *p == PROGRESS_FAILED)
    }

    /// Check if this event reports a successfully completed export.
    pub fn is_export_done(&self) -> bool {
        matches!(self, TableEvent::ExportProgress(p) if *p == PROGRESS_DONE)
    }
}
