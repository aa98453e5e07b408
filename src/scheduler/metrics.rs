//! # Run Metrics
//!
//! Per-worker claim counters for diagnosing load-balance skew.
//!
//! ## Design
//!
//! - **Worker-local counters**: each worker counts its claims in a plain
//!   stack local. No atomics, no sharing.
//! - **Returned through the join handle**: the worker's final
//!   [`WorkerReport`] is the thread's return value, so aggregation happens on
//!   the joining thread after the worker is gone.
//! - **Post-run aggregation**: [`RunReport::merge_worker`] folds reports in
//!   worker-id order.
//!
//! With non-uniform work, uneven claim counts are expected and healthy: fast
//! items let a worker come back for more. With uniform work (or a slow
//! producer in dynamic mode) counts flatten out.

use std::time::Duration;

use super::config::RangeMode;

/// Final counters for one worker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerReport {
    /// Worker ID (0..threads).
    pub worker_id: usize,
    /// Indices this worker claimed and processed.
    pub claims: u64,
    /// Wall time from the worker's first claim attempt to its exit.
    pub elapsed: Duration,
}

/// Aggregated counters for one `start()`..`join()` run.
#[derive(Clone, Debug, Default)]
pub struct RunReport {
    /// Mode the run executed in.
    pub mode: RangeMode,
    /// Per-worker reports, ordered by worker id.
    pub workers: Vec<WorkerReport>,
    /// Sum of all worker claims.
    pub total_claims: u64,
    /// Wall time from `start()` to the end of `join()`.
    pub elapsed: Duration,
}

impl RunReport {
    /// Empty report for a run in `mode`.
    pub fn new(mode: RangeMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Fold one worker's report in.
    pub fn merge_worker(&mut self, w: WorkerReport) {
        self.total_claims = self.total_claims.saturating_add(w.claims);
        self.workers.push(w);
    }

    /// Number of workers merged.
    #[inline]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Largest per-worker claim count (0 for an empty report).
    pub fn max_claims(&self) -> u64 {
        self.workers.iter().map(|w| w.claims).max().unwrap_or(0)
    }

    /// Smallest per-worker claim count (0 for an empty report).
    pub fn min_claims(&self) -> u64 {
        self.workers.iter().map(|w| w.claims).min().unwrap_or(0)
    }

    /// Mean claims per worker.
    pub fn mean_claims(&self) -> f64 {
        if self.workers.is_empty() {
            0.0
        } else {
            self.total_claims as f64 / self.workers.len() as f64
        }
    }

    /// Load skew: `max_claims / mean_claims`.
    ///
    /// 1.0 is a perfectly even split; `threads` means one worker did
    /// everything. Returns 0.0 when nothing was claimed.
    pub fn imbalance(&self) -> f64 {
        let mean = self.mean_claims();
        if mean == 0.0 {
            0.0
        } else {
            self.max_claims() as f64 / mean
        }
    }

    /// Claims per second over the run's wall time.
    pub fn claims_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.total_claims as f64 / secs
        }
    }
}
