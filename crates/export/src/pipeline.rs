//! Export pipeline
//!
//! Orchestrates one background export at a time for a [`SparseTable`]:
//!
//! 1. **Admission**: `request_export` returns immediately. At most one
//!    export job is active per table; a second request is rejected with
//!    [`Error::ExportInProgress`] so two bounds computations can never race.
//! 2. **Build worker**: a dedicated thread streams the table into output
//!    lines under the table lock (the build stage, `build.rs`).
//! 3. **Supervisor**: a second thread waits for the worker's result up to
//!    the configured timeout, performs the external write, and reports the
//!    terminal outcome. On timeout the worker is abandoned, not killed: it
//!    keeps running and its eventual result is discarded with the channel.
//!    This is a deliberate trade-off; the worker only holds clones of
//!    shared state, so nothing it touches can dangle.
//!
//! Progress is reported through the table's [`EventHub`]:
//! whole-percent values in `[0, 1)` during the build, then exactly one
//! terminal [`PROGRESS_DONE`] or [`PROGRESS_FAILED`].

use crate::build::{build_lines, BuildContext};
use crate::writer::{validate_destination, CSV_EXTENSION, DEFAULT_FILE_NAME};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;
use std::time::Duration;
use tabgrid_core::{
    Error, LineWriter, PathResolver, Result, TableEvent, PROGRESS_DONE, PROGRESS_FAILED,
};
use tabgrid_table::{EventHub, SparseTable};

/// Wall-clock limit the supervisor grants the build stage by default.
pub const DEFAULT_EXPORT_TIMEOUT: Duration = Duration::from_secs(150);

/// Parameters for one export request.
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    /// Clear the table and the destination path after a successful write.
    pub clear_on_complete: bool,
    /// Wall-clock limit for the build stage.
    pub timeout: Duration,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            clear_on_complete: false,
            timeout: DEFAULT_EXPORT_TIMEOUT,
        }
    }
}

impl ExportOptions {
    /// Default options: keep contents after export, 150 s timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether the table and destination are cleared on success.
    pub fn clear_on_complete(mut self, clear: bool) -> Self {
        self.clear_on_complete = clear;
        self
    }

    /// Override the build-stage timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Transient state for one in-flight export.
struct ExportJob {
    cancel: Arc<AtomicBool>,
    progress: Arc<Mutex<f64>>,
    supervisor: Option<JoinHandle<()>>,
}

struct PipelineInner {
    table: SparseTable,
    events: EventHub,
    destination: Mutex<Option<PathBuf>>,
    job: Mutex<Option<ExportJob>>,
    resolver: Arc<dyn PathResolver>,
    writer: Arc<dyn LineWriter>,
}

impl PipelineInner {
    /// Record and emit a terminal progress value for the active job.
    fn finish_progress(&self, value: f64) {
        if let Some(job) = self.job.lock().as_ref() {
            *job.progress.lock() = value;
        }
        self.events.emit(TableEvent::ExportProgress(value));
    }
}

impl Drop for PipelineInner {
    fn drop(&mut self) {
        // Teardown forces cancellation so a worker still in flight exits at
        // its next poll instead of building output nobody will read.
        if let Some(job) = self.job.get_mut().as_ref() {
            job.cancel.store(true, Ordering::SeqCst);
        }
    }
}

/// Background export orchestrator for one table instance.
///
/// # Thread Safety
///
/// All methods may be called from any thread. Admission, cancellation and
/// job completion are serialized through the internal job slot.
pub struct ExportPipeline {
    inner: Arc<PipelineInner>,
}

impl ExportPipeline {
    /// Create a pipeline exporting `table`, reporting through `events`.
    pub fn new(
        table: SparseTable,
        events: EventHub,
        resolver: Arc<dyn PathResolver>,
        writer: Arc<dyn LineWriter>,
    ) -> Self {
        ExportPipeline {
            inner: Arc::new(PipelineInner {
                table,
                events,
                destination: Mutex::new(None),
                job: Mutex::new(None),
                resolver,
                writer,
            }),
        }
    }

    /// Set the export destination, validating the candidate path.
    ///
    /// With `Some(path)` the path itself is validated; with `None` the
    /// configured [`PathResolver`] is asked, and "no result" is treated as
    /// user cancellation, not an error. Invalid candidates are rejected
    /// with a logged diagnostic and leave the previous destination intact.
    ///
    /// Returns whether a usable destination is now set.
    pub fn set_destination(&self, path: Option<PathBuf>) -> bool {
        let candidate = match path {
            Some(path) => path,
            None => match self
                .inner
                .resolver
                .resolve_save_path(DEFAULT_FILE_NAME, CSV_EXTENSION)
            {
                Some(path) => path,
                None => {
                    tracing::debug!("path resolver supplied no destination");
                    return false;
                }
            },
        };

        match validate_destination(&candidate) {
            Ok(()) => {
                tracing::debug!(path = %candidate.display(), "export destination set");
                *self.inner.destination.lock() = Some(candidate);
                true
            }
            Err(error) => {
                tracing::warn!(path = %candidate.display(), %error, "rejected export destination");
                false
            }
        }
    }

    /// The currently configured destination, if any.
    pub fn destination(&self) -> Option<PathBuf> {
        self.inner.destination.lock().clone()
    }

    /// Start a background export and return immediately.
    ///
    /// Without a destination this is a silent no-op (callers are expected
    /// to check [`set_destination`]'s result). While another export is
    /// active, returns [`Error::ExportInProgress`]. The outcome is reported
    /// to subscribers as a terminal [`TableEvent::ExportProgress`] value.
    ///
    /// [`set_destination`]: ExportPipeline::set_destination
    pub fn request_export(&self, options: ExportOptions) -> Result<()> {
        let destination = match self.inner.destination.lock().clone() {
            Some(path) => path,
            None => {
                tracing::debug!("no export destination set; skipping export");
                return Ok(());
            }
        };

        let mut slot = self.inner.job.lock();
        if slot.is_some() {
            return Err(Error::ExportInProgress);
        }

        let cancel = Arc::new(AtomicBool::new(false));
        let progress = Arc::new(Mutex::new(0.0));
        let (results_tx, results_rx) = mpsc::channel();

        let ctx = BuildContext {
            cancel: Arc::clone(&cancel),
            progress: Arc::clone(&progress),
            events: self.inner.events.clone(),
        };
        let table = self.inner.table.clone();
        std::thread::Builder::new()
            .name("tabgrid-export-build".into())
            .spawn(move || {
                let lines = build_lines(&table, &ctx);
                // A timed-out supervisor has dropped the receiver; the
                // result is then discarded here.
                let _ = results_tx.send(lines);
            })?;

        let inner = Arc::clone(&self.inner);
        let path = destination.clone();
        let supervisor = match std::thread::Builder::new()
            .name("tabgrid-export".into())
            .spawn(move || supervise(inner, results_rx, path, options))
        {
            Ok(handle) => handle,
            Err(error) => {
                // The build is already running; tell it to stop. Its send
                // lands in the dropped channel.
                cancel.store(true, Ordering::SeqCst);
                return Err(error.into());
            }
        };

        *slot = Some(ExportJob {
            cancel,
            progress,
            supervisor: Some(supervisor),
        });
        tracing::info!(path = %destination.display(), "export started");
        Ok(())
    }

    /// Request cancellation of the active export.
    ///
    /// Idempotent; a no-op when no export is active. The build observes the
    /// flag cooperatively at its next poll, so cancellation latency is
    /// bounded by one cell's work plus a percent-boundary check.
    pub fn cancel_export(&self) {
        if let Some(job) = self.inner.job.lock().as_ref() {
            job.cancel.store(true, Ordering::SeqCst);
            tracing::debug!("export cancellation requested");
        }
    }

    /// Last reported progress of the active export, if one is running.
    pub fn progress(&self) -> Option<f64> {
        self.inner.job.lock().as_ref().map(|job| *job.progress.lock())
    }

    /// Check if an export job is currently active.
    pub fn export_in_progress(&self) -> bool {
        self.inner.job.lock().is_some()
    }

    /// Cancel any active export and wait for its supervisor to finish.
    ///
    /// The wait is bounded: the supervisor never outlives the export
    /// timeout. The build worker itself may still be running afterwards
    /// (abandoned), but it only holds clones of shared state.
    pub fn close(&self) {
        let (cancel, supervisor) = {
            let mut slot = self.inner.job.lock();
            match slot.as_mut() {
                Some(job) => (Some(Arc::clone(&job.cancel)), job.supervisor.take()),
                None => (None, None),
            }
        };
        if let Some(cancel) = cancel {
            cancel.store(true, Ordering::SeqCst);
        }
        if let Some(handle) = supervisor {
            let _ = handle.join();
        }
    }
}

/// Supervisor body: bound the build by the timeout, write, report, release.
fn supervise(
    inner: Arc<PipelineInner>,
    results: mpsc::Receiver<Vec<String>>,
    destination: PathBuf,
    options: ExportOptions,
) {
    let outcome = match results.recv_timeout(options.timeout) {
        Err(_) => {
            tracing::warn!(
                path = %destination.display(),
                timeout_ms = options.timeout.as_millis() as u64,
                "export build exceeded its deadline; worker abandoned"
            );
            Err(Error::Timeout)
        }
        // The empty result is the build's cancellation sentinel; an empty
        // table still produces one line.
        Ok(lines) if lines.is_empty() => Err(Error::Cancelled),
        Ok(lines) => {
            if inner.writer.write_lines(&destination, &lines) {
                Ok(lines.len())
            } else {
                Err(Error::WriteFailed(destination.display().to_string()))
            }
        }
    };

    match outcome {
        Ok(line_count) => {
            inner.finish_progress(PROGRESS_DONE);
            tracing::info!(path = %destination.display(), lines = line_count, "export finished");
            if options.clear_on_complete {
                *inner.destination.lock() = None;
                inner.table.clear();
            }
        }
        Err(error) => {
            tracing::warn!(path = %destination.display(), %error, "export failed");
            inner.finish_progress(PROGRESS_FAILED);
        }
    }

    // Release the job slot last so a follow-up export is admissible the
    // moment the outcome has been reported.
    *inner.job.lock() = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabgrid_core::NoPathResolver;

    struct StaticResolver(PathBuf);

    impl PathResolver for StaticResolver {
        fn resolve_save_path(&self, _default_name: &str, _extension: &str) -> Option<PathBuf> {
            Some(self.0.clone())
        }
    }

    struct RecordingWriter {
        calls: Arc<Mutex<Vec<(PathBuf, Vec<String>)>>>,
    }

    impl LineWriter for RecordingWriter {
        fn write_lines(&self, path: &std::path::Path, lines: &[String]) -> bool {
            self.calls.lock().push((path.to_path_buf(), lines.to_vec()));
            true
        }
    }

    fn pipeline_with(
        resolver: Arc<dyn PathResolver>,
    ) -> (ExportPipeline, Arc<Mutex<Vec<(PathBuf, Vec<String>)>>>) {
        let events = EventHub::new().unwrap();
        let table = SparseTable::new(events.clone());
        let calls = Arc::new(Mutex::new(Vec::new()));
        let writer = Arc::new(RecordingWriter {
            calls: Arc::clone(&calls),
        });
        (ExportPipeline::new(table, events, resolver, writer), calls)
    }

    #[test]
    fn test_set_destination_validates_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, _) = pipeline_with(Arc::new(NoPathResolver));

        assert!(!pipeline.set_destination(Some(dir.path().join("data.txt"))));
        assert_eq!(pipeline.destination(), None);

        assert!(pipeline.set_destination(Some(dir.path().join("data.csv"))));
        assert_eq!(pipeline.destination(), Some(dir.path().join("data.csv")));

        // A rejected candidate leaves the previous destination intact.
        assert!(!pipeline.set_destination(Some(dir.path().join("other.txt"))));
        assert_eq!(pipeline.destination(), Some(dir.path().join("data.csv")));
    }

    #[test]
    fn test_set_destination_asks_resolver_when_unset() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = dir.path().join("picked.csv");
        let (pipeline, _) = pipeline_with(Arc::new(StaticResolver(resolved.clone())));

        assert!(pipeline.set_destination(None));
        assert_eq!(pipeline.destination(), Some(resolved));
    }

    #[test]
    fn test_resolver_cancellation_is_not_an_error() {
        let (pipeline, _) = pipeline_with(Arc::new(NoPathResolver));
        assert!(!pipeline.set_destination(None));
        assert_eq!(pipeline.destination(), None);
    }

    #[test]
    fn test_export_without_destination_is_a_silent_no_op() {
        let (pipeline, calls) = pipeline_with(Arc::new(NoPathResolver));
        pipeline.request_export(ExportOptions::new()).unwrap();
        assert!(!pipeline.export_in_progress());
        assert!(calls.lock().is_empty());
    }

    #[test]
    fn test_cancel_without_active_export_is_a_no_op() {
        let (pipeline, _) = pipeline_with(Arc::new(NoPathResolver));
        pipeline.cancel_export();
        pipeline.cancel_export();
        assert_eq!(pipeline.progress(), None);
    }
}
