//! Export layer for tabgrid
//!
//! This crate orchestrates the background export of a [`SparseTable`] to a
//! delimited text file:
//! - [`ExportPipeline`]: destination management, job admission, worker and
//!   supervisor threads, cancellation and timeout
//! - [`FsLineWriter`]: the production filesystem writer
//!
//! One export runs at a time per table; a second request while one is in
//! flight is rejected with [`tabgrid_core::Error::ExportInProgress`].
//!
//! [`SparseTable`]: tabgrid_table::SparseTable

#![warn(missing_docs)]
#![warn(clippy::all)]

mod build;
pub mod pipeline;
pub mod writer;

pub use build::FIELD_SEPARATOR;
pub use pipeline::{ExportOptions, ExportPipeline, DEFAULT_EXPORT_TIMEOUT};
pub use writer::{FsLineWriter, CSV_EXTENSION, DEFAULT_FILE_NAME};
