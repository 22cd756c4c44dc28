//! Unified error types for tabgrid.
//!
//! This module provides the canonical error type for all table and export
//! operations. Export failures are terminal to the current export attempt
//! only; the table remains usable afterwards.

use thiserror::Error;

/// All tabgrid errors.
///
/// This is the canonical error type for all tabgrid operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Destination path rejected by validation (extension, missing directory)
    #[error("invalid destination: {0}")]
    InvalidDestination(String),

    /// An export is already running on this table
    #[error("an export is already in progress")]
    ExportInProgress,

    /// The export build observed the cancellation flag and produced no output
    #[error("export cancelled")]
    Cancelled,

    /// The supervisor's wait on the build stage expired
    #[error("export timed out")]
    Timeout,

    /// The external writer reported failure
    #[error("failed to write export output: {0}")]
    WriteFailed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for tabgrid operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is the busy rejection for a second concurrent export.
    pub fn is_busy(&self) -> bool {
        matches!(self, Error::ExportInProgress)
    }

    /// Check if this error terminated an export attempt.
    ///
    /// Terminal export errors leave the table and the destination path in
    /// their prior state.
    pub fn is_export_failure(&self) -> bool {
        matches!(
            self,
            Error::Cancelled | Error::Timeout | Error::WriteFailed(_)
        )
    }
}
