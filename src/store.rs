//! Main entry point for tabgrid.
//!
//! This module provides the [`TableStore`] struct, the primary handle for
//! all table and export operations, plus its builder.

use std::path::PathBuf;
use std::sync::Arc;

use tabgrid_core::{Cell, LineWriter, NoPathResolver, PathResolver, Result, TableEvent};
use tabgrid_export::{ExportOptions, ExportPipeline, FsLineWriter};
use tabgrid_table::{EventHub, SparseTable, SubscriptionId};

/// A thread-safe sparse table with a background export pipeline.
///
/// This is the main entry point. Create one with [`TableStore::new`] for
/// defaults, or [`TableStore::builder`] to inject a path resolver or a
/// custom writer.
///
/// # Example
///
/// ```no_run
/// use tabgrid::{Cell, ExportOptions, TableStore};
///
/// # fn main() -> tabgrid::Result<()> {
/// let store = TableStore::new()?;
/// store.insert(Cell::new(0, 0), "name");
/// store.insert(Cell::new(1, 0), "count");
///
/// if store.set_destination(Some("/tmp/report.csv".into())) {
///     store.request_export(ExportOptions::new())?;
/// }
///
/// store.close()?;
/// # Ok(())
/// # }
/// ```
///
/// # Thread Safety
///
/// Every method may be called concurrently from any number of threads.
/// Mutations are linearized by the table's one lock; notifications are
/// delivered on a dedicated thread in operation-completion order.
pub struct TableStore {
    table: SparseTable,
    pipeline: ExportPipeline,
    events: EventHub,
}

impl TableStore {
    /// Create a store with default collaborators.
    ///
    /// The default path resolver never supplies a path (headless host), so
    /// exports require an explicit [`set_destination`]. Output is written
    /// through the filesystem writer.
    ///
    /// [`set_destination`]: TableStore::set_destination
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a builder for store configuration.
    pub fn builder() -> TableStoreBuilder {
        TableStoreBuilder::default()
    }

    // ---- Table operations -------------------------------------------------

    /// Return a row-major ordered snapshot copy of the current contents.
    pub fn get_all(&self) -> std::collections::BTreeMap<Cell, String> {
        self.table.get_all()
    }

    /// Return the value at `cell`, or the empty string if absent.
    pub fn get(&self, cell: Cell) -> String {
        self.table.get(cell)
    }

    /// Insert or overwrite one cell. Fires one update notification.
    pub fn insert(&self, cell: Cell, value: impl Into<String>) {
        self.table.insert(cell, value);
    }

    /// Merge a batch of entries with one update notification for the batch.
    pub fn append<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (Cell, String)>,
    {
        self.table.append(entries);
    }

    /// Remove a cell if present. Fires one update notification.
    pub fn remove(&self, cell: Cell) {
        self.table.remove(cell);
    }

    /// Empty the table. Fires one update notification.
    pub fn clear(&self) {
        self.table.clear();
    }

    /// Number of stored cells.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if no cells are stored.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Maximum (column, row) among present keys; `(0, 0)` when empty.
    pub fn bounds(&self) -> (u32, u32) {
        self.table.bounds()
    }

    // ---- Notifications ----------------------------------------------------

    /// Register a subscriber for update and export-progress events.
    ///
    /// The callback runs on the store's notification thread, never on the
    /// thread that holds the table lock, so it may read the table back.
    pub fn subscribe(
        &self,
        callback: impl Fn(&TableEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(callback)
    }

    /// Remove a subscriber. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // ---- Export -----------------------------------------------------------

    /// Set the export destination; see [`ExportPipeline::set_destination`].
    pub fn set_destination(&self, path: Option<PathBuf>) -> bool {
        self.pipeline.set_destination(path)
    }

    /// The currently configured destination, if any.
    pub fn destination(&self) -> Option<PathBuf> {
        self.pipeline.destination()
    }

    /// Start a background export; see [`ExportPipeline::request_export`].
    pub fn request_export(&self, options: ExportOptions) -> Result<()> {
        self.pipeline.request_export(options)
    }

    /// Request cancellation of the active export. Idempotent.
    pub fn cancel_export(&self) {
        self.pipeline.cancel_export()
    }

    /// Last reported progress of the active export, if one is running.
    pub fn export_progress(&self) -> Option<f64> {
        self.pipeline.progress()
    }

    /// Check if an export job is currently active.
    pub fn export_in_progress(&self) -> bool {
        self.pipeline.export_in_progress()
    }

    /// Graceful shutdown.
    ///
    /// Cancels any in-flight export and waits (bounded by the export
    /// timeout) for its supervisor, then drains and joins the notification
    /// thread. An abandoned build worker may briefly outlive the store; it
    /// only holds clones of the shared state.
    pub fn close(self) -> Result<()> {
        self.pipeline.close();
        tracing::debug!("table store closed");
        Ok(())
    }
}

/// Builder for [`TableStore`] configuration.
///
/// # Example
///
/// ```ignore
/// let store = TableStore::builder()
///     .resolver(Arc::new(MyDialogResolver))
///     .writer(Arc::new(FsLineWriter))
///     .build()?;
/// ```
pub struct TableStoreBuilder {
    resolver: Arc<dyn PathResolver>,
    writer: Arc<dyn LineWriter>,
}

impl Default for TableStoreBuilder {
    fn default() -> Self {
        TableStoreBuilder {
            resolver: Arc::new(NoPathResolver),
            writer: Arc::new(FsLineWriter),
        }
    }
}

impl TableStoreBuilder {
    /// Use a host-supplied path resolver for exports without an explicit
    /// destination.
    pub fn resolver(mut self, resolver: Arc<dyn PathResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Use a custom line writer instead of the filesystem writer.
    pub fn writer(mut self, writer: Arc<dyn LineWriter>) -> Self {
        self.writer = writer;
        self
    }

    /// Build the store, spawning its notification thread.
    pub fn build(self) -> Result<TableStore> {
        let events = EventHub::new()?;
        let table = SparseTable::new(events.clone());
        let pipeline =
            ExportPipeline::new(table.clone(), events.clone(), self.resolver, self.writer);
        Ok(TableStore {
            table,
            pipeline,
            events,
        })
    }
}
