//! Background execution of export runs

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::error::{Error, Result};
use crate::export::{ExportSummary, LibraryExporter};
use crate::source::LibrarySource;

/// A library source that can be handed to the background worker
pub type SharedSource = Arc<dyn LibrarySource + Send + Sync>;

/// Runs exports on a worker thread, one at a time
///
/// Clones share the in-flight flag, so every clone sees the same run.
#[derive(Debug, Clone, Default)]
pub struct ExportRunner {
    in_flight: Arc<AtomicBool>,
}

/// Exclusive right to run one export on an [`ExportRunner`]
///
/// The runner stays busy until the claim is dropped, either unused or at the
/// end of the worker it was moved into (panics included).
#[derive(Debug)]
pub struct RunClaim(Arc<AtomicBool>);

impl Drop for RunClaim {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl RunClaim {
    /// Start `exporter` on a worker thread and call `on_complete` with its result.
    ///
    /// The claim is released before `on_complete` runs, so the callback may
    /// start the next export.
    pub fn spawn<F>(
        self,
        exporter: LibraryExporter,
        source: SharedSource,
        on_complete: F,
    ) -> Result<JoinHandle<()>>
    where
        F: FnOnce(Result<ExportSummary>) + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name("library-export".to_string())
            .spawn(move || {
                let result = exporter.export(source.as_ref());
                drop(self);
                on_complete(result);
            })?;

        Ok(handle)
    }
}

impl ExportRunner {
    /// Create an idle runner
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an export is currently running
    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Reserve the runner for one export.
    ///
    /// Fails with [`Error::ExportInProgress`] if a run is already claimed or
    /// in flight.
    pub fn claim(&self) -> Result<RunClaim> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::ExportInProgress)?;

        Ok(RunClaim(Arc::clone(&self.in_flight)))
    }

    /// Claim the runner and start `exporter` on a worker thread.
    ///
    /// Fails with [`Error::ExportInProgress`] without starting anything if a
    /// run is already in flight. See [`RunClaim::spawn`].
    pub fn spawn<F>(
        &self,
        exporter: LibraryExporter,
        source: SharedSource,
        on_complete: F,
    ) -> Result<JoinHandle<()>>
    where
        F: FnOnce(Result<ExportSummary>) + Send + 'static,
    {
        self.claim()?.spawn(exporter, source, on_complete)
    }
}
