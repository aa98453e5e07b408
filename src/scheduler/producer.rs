//! Producer handle for dynamic-range runs.
//!
//! A [`RangeProducer`] lets a thread other than the scheduler's owner grow
//! the work range while workers drain it. It is the seam between "generate
//! work" (decode a block, read a chunk) and "process work".
//!
//! The range stays open while any handle of the current run is alive, and
//! `join()` waits for it. Close or drop producers held on the joining thread
//! before calling `join()`. A handle from a run that has been joined is
//! inert. Epochs and close rules are described under
//! [Producer Runs](super::cursor#producer-runs).

use std::sync::Arc;

use super::cursor::ClaimCursor;
use super::error::SchedulerError;

/// Cloneable handle that extends and closes a dynamic work range.
///
/// # Thread Safety
///
/// `Send + Sync + Clone`. Several producers may extend concurrently; the
/// range stays open until one of them closes it or all of them drop.
#[derive(Debug)]
pub struct RangeProducer {
    cursor: Arc<ClaimCursor>,
    epoch: u64,
}

impl RangeProducer {
    pub(crate) fn attach(cursor: Arc<ClaimCursor>) -> Self {
        let epoch = cursor.attach_producer();
        Self { cursor, epoch }
    }

    /// Make one more index claimable. Returns the new limit.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::Closed`] once the range has been closed.
    #[inline]
    pub fn extend(&self) -> Result<usize, SchedulerError> {
        self.extend_by(1)
    }

    /// Make `by` more indices claimable. Returns the new limit.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::Closed`] once the range has been closed, or
    /// [`SchedulerError::LimitOverflow`].
    #[inline]
    pub fn extend_by(&self, by: usize) -> Result<usize, SchedulerError> {
        self.cursor.extend_in(Some(self.epoch), by)
    }

    /// Signal that no more work is coming this run. Idempotent.
    pub fn close(&self) {
        self.cursor.close_in(self.epoch);
    }

    /// Current exclusive limit (snapshot).
    pub fn limit(&self) -> usize {
        self.cursor.snapshot().limit
    }

    /// Whether this handle's run has been closed (snapshot).
    pub fn is_closed(&self) -> bool {
        !self.cursor.is_open_in(self.epoch)
    }
}

impl Clone for RangeProducer {
    fn clone(&self) -> Self {
        Self::attach(Arc::clone(&self.cursor))
    }
}

impl Drop for RangeProducer {
    fn drop(&mut self) {
        self.cursor.detach_producer(self.epoch);
    }
}
