//! Convenient imports for tabgrid.
//!
//! This module re-exports the most commonly used types so you can get
//! started with a single import:
//!
//! ```no_run
//! use tabgrid::prelude::*;
//!
//! # fn main() -> tabgrid::Result<()> {
//! let store = TableStore::new()?;
//! store.insert(Cell::new(0, 0), "value");
//! # Ok(())
//! # }
//! ```

// Main entry point
pub use crate::store::{TableStore, TableStoreBuilder};

// Error handling
pub use tabgrid_core::{Error, Result};

// Core types
pub use tabgrid_core::{Cell, TableEvent, PROGRESS_DONE, PROGRESS_FAILED};

// Export configuration
pub use tabgrid_export::{ExportOptions, DEFAULT_EXPORT_TIMEOUT};

// Collaborator traits
pub use tabgrid_core::{LineWriter, PathResolver};
