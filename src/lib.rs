//! # Tabgrid
//!
//! Thread-safe sparse two-dimensional table store with a background
//! delimited-text export pipeline.
//!
//! Tabgrid keeps a coordinate→value map behind one exclusive lock so any
//! number of threads can mutate it, and exports it off-thread to a
//! comma-delimited file with throttled progress reporting, cooperative
//! cancellation and a supervisor-enforced timeout.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tabgrid::prelude::*;
//!
//! # fn main() -> tabgrid::Result<()> {
//! let store = TableStore::new()?;
//!
//! // Mutate from any thread.
//! store.insert(Cell::new(0, 0), "name");
//! store.append(vec![
//!     (Cell::new(0, 1), "alice".to_string()),
//!     (Cell::new(0, 2), "bob".to_string()),
//! ]);
//!
//! // Observe updates and export progress.
//! store.subscribe(|event| println!("{:?}", event));
//!
//! // Export in the background.
//! store.set_destination(Some("/tmp/out.csv".into()));
//! store.request_export(ExportOptions::new())?;
//!
//! // Graceful shutdown.
//! store.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Guarantees
//!
//! - Mutations and reads are linearized by one lock per store.
//! - Notifications are delivered in operation-completion order on a single
//!   dedicated thread, never on a thread holding the table lock.
//! - One export runs at a time; a second request is rejected as busy.
//! - Progress events are throttled to whole-percent changes (about one
//!   hundred per export regardless of table size), ending in exactly one
//!   terminal value: `1.0` on success, `-1.0` on failure or cancellation.

#![warn(missing_docs)]

mod store;

pub mod prelude;

// Re-export main entry points
pub use store::{TableStore, TableStoreBuilder};

// Re-export core types
pub use tabgrid_core::{
    Cell, Error, LineWriter, NoPathResolver, PathResolver, Result, TableEvent, PROGRESS_DONE,
    PROGRESS_FAILED,
};

// Re-export table and export building blocks for hosts that compose their
// own pipeline.
pub use tabgrid_export::{
    ExportOptions, ExportPipeline, FsLineWriter, CSV_EXTENSION, DEFAULT_EXPORT_TIMEOUT,
    DEFAULT_FILE_NAME, FIELD_SEPARATOR,
};
pub use tabgrid_table::{EventHub, SparseTable, SubscriptionId};
