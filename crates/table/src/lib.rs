//! Table layer for tabgrid
//!
//! This crate implements the shared in-memory table state:
//! - [`SparseTable`]: coordinate→value map behind one exclusive lock
//! - [`EventHub`]: the single notification lane with its delivery thread
//!
//! All mutation and full-read operations are linearized by the table's one
//! lock; notifications are emitted after the lock is released and delivered
//! on the hub's own thread.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod notify;
pub mod store;

pub use notify::{EventHub, SubscriptionId};
pub use store::{max_bounds, SparseTable};
