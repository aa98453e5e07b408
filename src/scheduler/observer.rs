//! Pluggable reporting of per-worker load distribution.
//!
//! Workers call [`RunObserver::on_worker_exit`] from their own thread right
//! before they return, so callbacks run concurrently. Observers that write to
//! a shared sink must serialize; [`LinePrinter`] holds one mutex around its
//! writer so report lines never interleave.

use std::io::Write;
use std::sync::Mutex;

use super::metrics::{RunReport, WorkerReport};

/// Hook for worker-exit and run-complete events.
pub trait RunObserver: Send + Sync {
    /// Called on the worker thread after its last claim attempt.
    fn on_worker_exit(&self, report: &WorkerReport);

    /// Called on the joining thread once every worker has been joined.
    fn on_run_complete(&self, _report: &RunReport) {}
}

/// Emits `tracing` debug events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn on_worker_exit(&self, report: &WorkerReport) {
        tracing::debug!(
            worker_id = report.worker_id,
            claims = report.claims,
            elapsed_us = report.elapsed.as_micros() as u64,
            "worker exited"
        );
    }

    fn on_run_complete(&self, report: &RunReport) {
        tracing::debug!(
            mode = %report.mode,
            workers = report.worker_count(),
            total_claims = report.total_claims,
            max_claims = report.max_claims(),
            min_claims = report.min_claims(),
            "run complete"
        );
    }
}

/// Writes one `worker <id> claimed: <n>` line per worker exit.
///
/// Write errors are dropped; this is diagnostic output.
#[derive(Debug)]
pub struct LinePrinter<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> LinePrinter<W> {
    /// Wrap a writer.
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(w) => w,
            Err(poison) => poison.into_inner(),
        }
    }
}

impl LinePrinter<std::io::Stderr> {
    /// Printer over standard error.
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write + Send> RunObserver for LinePrinter<W> {
    fn on_worker_exit(&self, report: &WorkerReport) {
        let mut out = match self.out.lock() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        };
        let _ = writeln!(out, "worker {} claimed: {}", report.worker_id, report.claims);
    }
}
