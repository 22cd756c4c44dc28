//! Core types for the tabgrid table store
//!
//! This crate defines the fundamental types shared by every layer:
//! - [`Cell`]: (column, row) coordinate used as the table key
//! - [`TableEvent`]: notifications delivered to subscribers
//! - [`Error`] / [`Result`]: the canonical error taxonomy
//! - Collaborator traits: [`PathResolver`], [`LineWriter`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cell;
pub mod error;
pub mod events;
pub mod traits;

pub use cell::Cell;
pub use error::{Error, Result};
pub use events::{TableEvent, PROGRESS_DONE, PROGRESS_FAILED};
pub use traits::{LineWriter, NoPathResolver, PathResolver};
