//! Work contract: the single client extension point.
//!
//! A contract processes one integer-indexed unit of work. It has no return
//! value and no error channel; results go wherever the implementer decides
//! (typically a shared output structure the contract itself owns).
//!
//! # Ordering
//!
//! Indices are claimed in strictly increasing order from the shared cursor,
//! but `process` calls on different workers complete in any order. A contract
//! must not assume index order implies execution order across threads.
//!
//! # Failure
//!
//! The scheduler does not catch panics raised by `process`. The panicking
//! worker unwinds and the panic is re-raised on the thread that calls
//! [`Scheduler::join`](super::Scheduler::join).

/// Client-implemented callback invoked once per claimed index.
///
/// Called concurrently from every worker thread, hence `Send + Sync`.
/// Interior mutability (atomics, `Mutex`, per-worker slots keyed by
/// [`current_worker_id`](super::current_worker_id)) is the implementer's
/// responsibility.
///
/// # Example
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use workrange::WorkContract;
///
/// struct SumIndices(AtomicUsize);
///
/// impl WorkContract for SumIndices {
///     fn process(&self, index: usize) {
///         self.0.fetch_add(index, Ordering::Relaxed);
///     }
/// }
/// ```
pub trait WorkContract: Send + Sync {
    /// Process work unit `index`.
    fn process(&self, index: usize);
}

impl<F> WorkContract for F
where
    F: Fn(usize) + Send + Sync,
{
    #[inline]
    fn process(&self, index: usize) {
        self(index)
    }
}
