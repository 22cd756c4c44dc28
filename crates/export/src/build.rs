//! Export build stage
//!
//! Turns the table into output lines on the worker thread. The whole stage
//! runs under the table lock so it sees exactly one consistent state:
//!
//! 1. Recompute the table bounds.
//! 2. Walk rows `0..=max_row`, columns `0..=max_col`, appending each cell's
//!    value (empty for holes) plus the field separator, including after
//!    the last column, to stay byte-compatible with previously exported
//!    files.
//! 3. Poll the cancellation flag before every cell; emit progress only when
//!    the whole-percent count advances, which bounds the event volume to
//!    about one hundred per export regardless of table size.
//!
//! Cancellation returns an empty line vector. That is the unique "no output"
//! sentinel: a legitimately empty table still has bounds `(0, 0)` and
//! produces one line, so zero lines can only mean the build was abandoned.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tabgrid_core::{Cell, TableEvent};
use tabgrid_table::{max_bounds, EventHub, SparseTable};

/// Separator appended after every field, the last column included.
pub const FIELD_SEPARATOR: char = ',';

/// Shared state between one export job and its build stage.
pub(crate) struct BuildContext {
    pub(crate) cancel: Arc<AtomicBool>,
    pub(crate) progress: Arc<Mutex<f64>>,
    pub(crate) events: EventHub,
}

impl BuildContext {
    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    fn emit_progress(&self, value: f64) {
        *self.progress.lock() = value;
        self.events.emit(TableEvent::ExportProgress(value));
    }
}

/// Build the output lines for one export.
///
/// Runs on the worker thread with the table locked for the whole stage.
/// Returns the empty vector if and only if cancellation was observed.
pub(crate) fn build_lines(table: &SparseTable, ctx: &BuildContext) -> Vec<String> {
    table.with_cells(|cells| {
        let (max_col, max_row) = max_bounds(cells);
        let total = (u64::from(max_col) + 1) * (u64::from(max_row) + 1);

        let mut lines = Vec::with_capacity(max_row as usize + 1);
        let mut processed: u64 = 0;
        let mut last_percent: u64 = 0;

        for row in 0..=max_row {
            let mut line = String::new();
            for column in 0..=max_col {
                if ctx.cancelled() {
                    tracing::debug!(row, column, "export build observed cancellation");
                    return Vec::new();
                }

                if let Some(value) = cells.get(&Cell::new(column, row)) {
                    line.push_str(value);
                }
                line.push(FIELD_SEPARATOR);

                processed += 1;
                let percent = processed * 100 / total;
                if percent > last_percent && percent < 100 {
                    last_percent = percent;
                    ctx.emit_progress(processed as f64 / total as f64);
                    if ctx.cancelled() {
                        tracing::debug!(row, column, "export build observed cancellation");
                        return Vec::new();
                    }
                }
            }
            lines.push(line);
        }
        lines
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;
    use std::sync::mpsc;

    fn context(events: &EventHub) -> BuildContext {
        BuildContext {
            cancel: Arc::new(AtomicBool::new(false)),
            progress: Arc::new(Mutex::new(0.0)),
            events: events.clone(),
        }
    }

    fn collected(hub: EventHub) -> mpsc::Receiver<f64> {
        let (tx, rx) = mpsc::channel();
        hub.subscribe(move |event| {
            if let TableEvent::ExportProgress(p) = event {
                let _ = tx.send(*p);
            }
        });
        rx
    }

    #[test]
    fn test_empty_table_is_one_line() {
        let hub = EventHub::new().unwrap();
        let table = SparseTable::new(hub.clone());
        let ctx = context(&hub);
        assert_eq!(build_lines(&table, &ctx), vec![",".to_string()]);
    }

    #[test]
    fn test_single_cell_grid_shape() {
        let hub = EventHub::new().unwrap();
        let table = SparseTable::new(hub.clone());
        table.insert(Cell::new(2, 1), "v");
        let ctx = context(&hub);

        let lines = build_lines(&table, &ctx);
        assert_eq!(lines, vec![",,,".to_string(), ",,v,".to_string()]);
    }

    #[test]
    fn test_cancelled_build_returns_no_lines() {
        let hub = EventHub::new().unwrap();
        let table = SparseTable::new(hub.clone());
        table.insert(Cell::new(0, 0), "v");
        let ctx = context(&hub);
        ctx.cancel.store(true, Ordering::SeqCst);

        assert!(build_lines(&table, &ctx).is_empty());
    }

    #[test]
    fn test_progress_events_bounded_and_monotonic() {
        for dim in [2u32, 10, 100] {
            let hub = EventHub::new().unwrap();
            let table = SparseTable::new(hub.clone());
            for row in 0..dim {
                for column in 0..dim {
                    table.insert(Cell::new(column, row), "x");
                }
            }
            let rx = collected(hub.clone());
            let ctx = context(&hub);

            let lines = build_lines(&table, &ctx);
            assert_eq!(lines.len(), dim as usize);

            drop(ctx);
            drop(table);
            drop(hub); // join delivery so every event has landed
            let values: Vec<f64> = rx.iter().collect();
            // One event per whole-percent crossing below 100, never more.
            assert!(values.len() <= 100, "dim {}: {} events", dim, values.len());
            assert!(values.windows(2).all(|w| w[0] <= w[1]));
            assert!(values.iter().all(|p| (0.0..1.0).contains(p)));
        }
    }

    proptest! {
        #[test]
        fn prop_lines_match_naive_grid(
            entries in proptest::collection::hash_map(
                (0u32..8, 0u32..8),
                "[a-z]{0,4}",
                0..24,
            )
        ) {
            let hub = EventHub::new().unwrap();
            let table = SparseTable::new(hub.clone());
            let model: HashMap<(u32, u32), String> = entries.clone();
            table.append(
                entries
                    .into_iter()
                    .map(|((column, row), v)| (Cell::new(column, row), v)),
            );
            let ctx = context(&hub);

            let lines = build_lines(&table, &ctx);

            let (max_col, max_row) = table.bounds();
            prop_assert_eq!(lines.len() as u32, max_row + 1);
            for (row, line) in lines.iter().enumerate() {
                let mut expected = String::new();
                for column in 0..=max_col {
                    if let Some(v) = model.get(&(column, row as u32)) {
                        expected.push_str(v);
                    }
                    expected.push(FIELD_SEPARATOR);
                }
                prop_assert_eq!(line, &expected);
            }
        }
    }
}
