//! Scheduler error taxonomy.
//!
//! The scheduler has almost no internal failure modes. Everything here is
//! either a configuration problem caught at construction, protocol misuse by
//! the caller (fail loudly rather than deadlock or duplicate work), or the OS
//! refusing to give us a thread.
//!
//! Client callback failures are deliberately absent: a panic inside
//! `WorkContract::process` unwinds its worker and is re-raised by `join()`.

use std::io;

/// Errors returned by [`Scheduler`](super::Scheduler) and
/// [`RangeProducer`](super::RangeProducer).
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// Configuration cannot produce a working pool.
    #[error("invalid scheduler config: {0}")]
    InvalidConfig(&'static str),

    /// `start()` called while a previous run still holds worker handles.
    #[error("scheduler already running; join() the previous run first")]
    AlreadyRunning,

    /// `join()` called without a matching `start()`.
    #[error("scheduler not running")]
    NotRunning,

    /// A dynamic-range operation was invoked on a static-range scheduler.
    #[error("{op}() requires a dynamic-range scheduler")]
    StaticRange {
        /// Name of the rejected operation.
        op: &'static str,
    },

    /// `extend` after `close` in the same run.
    #[error("work range already closed; no further extension allowed")]
    Closed,

    /// Extending the limit would overflow `usize`.
    #[error("extending limit {limit} by {by} overflows")]
    LimitOverflow {
        /// Limit at the time of the call.
        limit: usize,
        /// Requested increment.
        by: usize,
    },

    /// The OS refused to spawn a worker thread.
    #[error("failed to spawn worker {worker_id}")]
    Spawn {
        /// Worker that could not be started.
        worker_id: usize,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
}
