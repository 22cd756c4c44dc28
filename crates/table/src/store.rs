//! Sparse table storage
//!
//! A [`SparseTable`] maps (column, row) coordinates to text values. Most
//! coordinates hold nothing; absent cells read as empty strings. One
//! exclusive lock serializes every read and write, which is what gives
//! callers linearizable semantics across threads.
//!
//! # Thread Safety
//!
//! All operations may be called concurrently from any number of threads.
//! The lock is held only while touching the map, never while notifying
//! subscribers, so a subscriber is free to read the table back.
//!
//! # Bounds
//!
//! The maximum column/row indices are not maintained per mutation; they are
//! recomputed on demand (at export time) via [`max_bounds`]. The access
//! pattern is bulk export, not range queries, so per-mutation bookkeeping
//! buys nothing.

use crate::notify::EventHub;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::sync::Arc;
use tabgrid_core::{Cell, TableEvent};

struct TableInner {
    cells: Mutex<FxHashMap<Cell, String>>,
    events: EventHub,
}

/// A thread-safe sparse two-dimensional table of text values.
///
/// Cheap to clone; all clones share the same state. A background task may
/// hold a clone while the original owner goes away; the shared state lives
/// until the last handle drops, so the task never dereferences freed
/// storage.
///
/// # Examples
///
/// ```
/// use tabgrid_core::Cell;
/// use tabgrid_table::{EventHub, SparseTable};
///
/// let table = SparseTable::new(EventHub::new().unwrap());
/// table.insert(Cell::new(0, 0), "header");
/// assert_eq!(table.get(Cell::new(0, 0)), "header");
/// assert_eq!(table.get(Cell::new(9, 9)), ""); // holes read as empty
/// ```
#[derive(Clone)]
pub struct SparseTable {
    inner: Arc<TableInner>,
}

impl SparseTable {
    /// Create an empty table that notifies through `events`.
    pub fn new(events: EventHub) -> Self {
        SparseTable {
            inner: Arc::new(TableInner {
                cells: Mutex::new(FxHashMap::default()),
                events,
            }),
        }
    }

    /// The notification lane this table emits on.
    pub fn events(&self) -> &EventHub {
        &self.inner.events
    }

    /// Return a row-major ordered snapshot of the current contents.
    ///
    /// The result is a copy: later mutations are never observable through
    /// it.
    pub fn get_all(&self) -> BTreeMap<Cell, String> {
        let cells = self.inner.cells.lock();
        cells.iter().map(|(k, v)| (*k, v.clone())).collect()
    }

    /// Return the value at `cell`, or the empty string if absent.
    ///
    /// Absence is valid and expected in a sparse table; it is not an error.
    pub fn get(&self, cell: Cell) -> String {
        let cells = self.inner.cells.lock();
        cells.get(&cell).cloned().unwrap_or_default()
    }

    /// Insert or overwrite one cell. Fires one update notification.
    pub fn insert(&self, cell: Cell, value: impl Into<String>) {
        let value = value.into();
        {
            let mut cells = self.inner.cells.lock();
            cells.insert(cell, value);
        }
        self.inner.events.emit(TableEvent::Updated);
    }

    /// Merge a batch of entries, overwriting colliding keys.
    ///
    /// Fires exactly one update notification for the whole batch; batching
    /// exists precisely to avoid a notification per key.
    pub fn append<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (Cell, String)>,
    {
        {
            let mut cells = self.inner.cells.lock();
            cells.extend(entries);
        }
        self.inner.events.emit(TableEvent::Updated);
    }

    /// Remove a cell if present. Fires one update notification.
    pub fn remove(&self, cell: Cell) {
        {
            let mut cells = self.inner.cells.lock();
            cells.remove(&cell);
        }
        self.inner.events.emit(TableEvent::Updated);
    }

    /// Empty the table. Fires one update notification.
    pub fn clear(&self) {
        {
            let mut cells = self.inner.cells.lock();
            cells.clear();
        }
        self.inner.events.emit(TableEvent::Updated);
    }

    /// Number of stored (non-hole) cells.
    pub fn len(&self) -> usize {
        self.inner.cells.lock().len()
    }

    /// Check if no cells are stored.
    pub fn is_empty(&self) -> bool {
        self.inner.cells.lock().is_empty()
    }

    /// Maximum (column, row) among present keys; `(0, 0)` when empty.
    pub fn bounds(&self) -> (u32, u32) {
        let cells = self.inner.cells.lock();
        max_bounds(&cells)
    }

    /// Run `f` with the table lock held for its entire duration.
    ///
    /// This is the export build's point-in-time view: the whole build runs
    /// against one consistent state, with mutators blocked until it
    /// returns. The lock is not re-entrant, so `f` must not call back into
    /// this table.
    pub fn with_cells<R>(&self, f: impl FnOnce(&FxHashMap<Cell, String>) -> R) -> R {
        let cells = self.inner.cells.lock();
        f(&cells)
    }
}

/// Maximum column and row indices among `cells`' keys, `(0, 0)` when empty.
pub fn max_bounds(cells: &FxHashMap<Cell, String>) -> (u32, u32) {
    cells.keys().fold((0, 0), |(max_col, max_row), cell| {
        (max_col.max(cell.column), max_row.max(cell.row))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SparseTable {
        SparseTable::new(EventHub::new().unwrap())
    }

    #[test]
    fn test_get_absent_is_empty_string() {
        let t = table();
        assert_eq!(t.get(Cell::new(3, 7)), "");
    }

    #[test]
    fn test_insert_overwrites() {
        let t = table();
        t.insert(Cell::new(1, 1), "a");
        t.insert(Cell::new(1, 1), "b");
        assert_eq!(t.get(Cell::new(1, 1)), "b");
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_append_merges_and_overwrites() {
        let t = table();
        t.insert(Cell::new(0, 0), "old");
        t.append(vec![
            (Cell::new(0, 0), "new".to_string()),
            (Cell::new(1, 0), "b".to_string()),
        ]);
        assert_eq!(t.get(Cell::new(0, 0)), "new");
        assert_eq!(t.get(Cell::new(1, 0)), "b");
    }

    #[test]
    fn test_remove_and_clear() {
        let t = table();
        t.insert(Cell::new(0, 0), "a");
        t.insert(Cell::new(1, 0), "b");
        t.remove(Cell::new(0, 0));
        t.remove(Cell::new(5, 5)); // absent: no-op
        assert_eq!(t.len(), 1);
        t.clear();
        assert!(t.is_empty());
    }

    #[test]
    fn test_get_all_is_a_snapshot() {
        let t = table();
        t.insert(Cell::new(0, 0), "before");
        let snapshot = t.get_all();
        t.insert(Cell::new(0, 0), "after");
        assert_eq!(snapshot[&Cell::new(0, 0)], "before");
    }

    #[test]
    fn test_get_all_is_row_major_ordered() {
        let t = table();
        t.insert(Cell::new(2, 0), "c");
        t.insert(Cell::new(0, 1), "d");
        t.insert(Cell::new(0, 0), "a");
        let keys: Vec<Cell> = t.get_all().into_keys().collect();
        assert_eq!(keys, vec![Cell::new(0, 0), Cell::new(2, 0), Cell::new(0, 1)]);
    }

    #[test]
    fn test_bounds() {
        let t = table();
        assert_eq!(t.bounds(), (0, 0));
        t.insert(Cell::new(2, 1), "x");
        t.insert(Cell::new(0, 4), "y");
        assert_eq!(t.bounds(), (2, 4));
        t.clear();
        assert_eq!(t.bounds(), (0, 0));
    }
}
