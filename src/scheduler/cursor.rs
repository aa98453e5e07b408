//! Shared claim cursor over a growable half-open range `[0, limit)`.
//!
//! # Purpose
//!
//! Hands out unique, monotonically increasing indices to any number of
//! concurrent workers, and signals exhaustion. This is the only state shared
//! between workers, and the only place a worker can block.
//!
//! # Correctness Invariants
//!
//! - **Unique**: a claimed index is never returned again within a run. The
//!   compare-and-advance happens in one lock-held step.
//! - **Gap-free**: indices are handed out as `0, 1, 2, ...` with no holes.
//! - **Bounded**: `cursor <= limit` whenever the lock is released.
//! - **Monotonic close**: `closed` goes false→true once per run; only
//!   [`reopen`](ClaimCursor::reopen) (between runs) clears it.
//! - **No premature exit**: a blocking claim that finds `cursor == limit`
//!   while the range is still open waits; it returns `None` only after
//!   observing `closed`.
//!
//! # State Machine
//!
//! ```text
//!                 extend(n)                    extend(n)
//!   ┌──────────┐ ─────────► ┌──────────────┐ ◄───────── (producer)
//!   │ drained  │            │  claimable   │
//!   │ c == l   │ ◄───────── │   c < l      │ ──► claim: c += 1
//!   └────┬─────┘  last claim└──────┬───────┘
//!        │ close()                 │ close()
//!        ▼                         ▼
//!   ┌──────────┐            ┌──────────────┐
//!   │ finished │ ◄───────── │   draining   │
//!   │ None     │ last claim │ no new work  │
//!   └──────────┘            └──────────────┘
//! ```
//!
//! # Wakeups
//!
//! | Operation        | Notify       | Why                                   |
//! |------------------|--------------|---------------------------------------|
//! | `extend(1)`      | `notify_one` | exactly one unit became claimable     |
//! | `extend(n > 1)`  | `notify_all` | up to `n` waiters can make progress   |
//! | `close()`        | `notify_all` | every parked worker must re-check     |
//!
//! Notifications are issued after the guard is dropped to keep the woken
//! thread from immediately blocking on the mutex.
//!
//! # Producer Runs
//!
//! - Each run of a dynamic scheduler is one **epoch**. [`reopen`] (called
//!   by `join()` between runs) bumps it and zeroes the producer count.
//! - A [`RangeProducer`](super::RangeProducer) records the epoch it attached
//!   in. Every producer operation (`extend`, `close`, detach on drop) checks
//!   that epoch under the lock and is a no-op, or `Closed`, once it is stale.
//! - The range closes on the first of: an explicit close, the last live
//!   producer of the epoch detaching, or `join()` finding no live producer.
//!   While a producer is alive `join()` does not close, it waits.
//! - Every close decided from guarded state (epoch, producer count) sets
//!   `closed` under the same guard that made the decision. A close that
//!   re-took the lock could land after `reopen` and end the next run.
//!
//! [`reopen`]: ClaimCursor::reopen
//!
//! # Performance Characteristics
//!
//! | Operation               | Cost                         |
//! |-------------------------|------------------------------|
//! | `claim_next()`          | Lock + compare + unlock      |
//! | `claim_next_blocking()` | Lock + condvar wait if empty |
//! | `extend()` / `close()`  | Lock + notify                |
//!
//! Fine for work units that cost microseconds or more. For sub-microsecond
//! units, batch several indices into one unit.

use crossbeam_utils::CachePadded;
#[cfg(loom)]
use loom::sync::{Condvar, Mutex, MutexGuard};
#[cfg(not(loom))]
use std::sync::{Condvar, Mutex, MutexGuard};

use super::error::SchedulerError;

/// Guarded group: every read and write goes through the cursor's mutex.
#[derive(Debug)]
struct RangeState {
    /// Exclusive upper bound of claimable indices.
    limit: usize,
    /// Next unclaimed index.
    cursor: usize,
    /// No further extension will happen this run.
    closed: bool,
    /// Live `RangeProducer` handles attached in this run.
    producers: usize,
    /// Run generation; bumped by `reopen`. Producers from an older run are
    /// detached and cannot touch the new range.
    epoch: u64,
}

/// Point-in-time copy of the cursor state.
///
/// Stale as soon as it is returned; meant for tests and diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeSnapshot {
    /// Exclusive upper bound at snapshot time.
    pub limit: usize,
    /// Next unclaimed index at snapshot time.
    pub cursor: usize,
    /// Whether the closure signal had been raised.
    pub closed: bool,
    /// Live producer handles.
    pub producers: usize,
}

impl RangeSnapshot {
    /// Indices added but not yet claimed.
    #[inline]
    pub fn pending(&self) -> usize {
        self.limit - self.cursor
    }
}

/// Mutex + condvar protected work cursor.
///
/// # Thread Safety
///
/// Shared via `Arc<ClaimCursor>` between the scheduler, its workers, and any
/// number of [`RangeProducer`](super::RangeProducer) handles. The protocol is
/// thread-identity agnostic; only call order matters (`close` must be the
/// last limit-affecting call of a run).
#[derive(Debug)]
pub struct ClaimCursor {
    /// Every claim takes this lock; keep it on its own cache line.
    state: CachePadded<Mutex<RangeState>>,
    cv: Condvar,
}

impl ClaimCursor {
    /// Create a cursor over `[0, limit)`, open for extension.
    pub fn new(limit: usize) -> Self {
        Self {
            state: CachePadded::new(Mutex::new(RangeState {
                limit,
                cursor: 0,
                closed: false,
                producers: 0,
                epoch: 0,
            })),
            cv: Condvar::new(),
        }
    }

    /// Lock state with poison recovery.
    ///
    /// Every guarded update is a plain integer or bool store, so a panic on
    /// another thread can never leave the state half-written. Recovering is
    /// always sound here.
    #[inline]
    fn lock(&self) -> MutexGuard<'_, RangeState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poison) => poison.into_inner(),
        }
    }

    #[inline]
    fn take_next(st: &mut RangeState) -> Option<usize> {
        if st.cursor < st.limit {
            let idx = st.cursor;
            st.cursor += 1;
            Some(idx)
        } else {
            None
        }
    }

    /// Claim the next index without blocking (static-range mode).
    ///
    /// Returns `None` once the cursor has reached the current limit.
    #[inline]
    pub fn claim_next(&self) -> Option<usize> {
        let mut st = self.lock();
        Self::take_next(&mut st)
    }

    /// Claim the next index, waiting while the range is drained but open
    /// (dynamic-range mode).
    ///
    /// Returns `None` only after the range is closed and fully claimed.
    pub fn claim_next_blocking(&self) -> Option<usize> {
        let mut st = self.lock();
        while !st.closed && st.cursor >= st.limit {
            st = match self.cv.wait(st) {
                Ok(guard) => guard,
                Err(poison) => poison.into_inner(),
            };
        }
        Self::take_next(&mut st)
    }

    /// Grow the limit by `by` and wake waiters.
    ///
    /// Returns the new limit.
    ///
    /// # Errors
    ///
    /// - [`SchedulerError::Closed`] if `close()` already ran this run.
    /// - [`SchedulerError::LimitOverflow`] if the limit would exceed `usize::MAX`.
    pub fn extend(&self, by: usize) -> Result<usize, SchedulerError> {
        self.extend_in(None, by)
    }

    /// `extend` on behalf of a producer attached in run `epoch`.
    pub(crate) fn extend_in(
        &self,
        epoch: Option<u64>,
        by: usize,
    ) -> Result<usize, SchedulerError> {
        let mut st = self.lock();
        if st.closed || epoch.is_some_and(|e| e != st.epoch) {
            return Err(SchedulerError::Closed);
        }
        let limit = st
            .limit
            .checked_add(by)
            .ok_or(SchedulerError::LimitOverflow {
                limit: st.limit,
                by,
            })?;
        st.limit = limit;
        drop(st);

        match by {
            0 => {}
            1 => self.cv.notify_one(),
            _ => self.cv.notify_all(),
        }
        tracing::trace!(limit, by, "work range extended");
        Ok(limit)
    }

    /// Raise the closure signal and wake every waiter.
    ///
    /// Returns `true` if this call performed the transition, `false` if the
    /// range was already closed. Idempotent.
    pub fn close(&self) -> bool {
        let mut st = self.lock();
        let first = Self::close_locked(&mut st);
        drop(st);
        self.cv.notify_all();
        first
    }

    /// Raise `closed` under a guard the caller already holds.
    ///
    /// Callers that decide to close based on other guarded fields (epoch,
    /// producer count) must close through this under the same guard, then
    /// notify after dropping it.
    fn close_locked(st: &mut RangeState) -> bool {
        let first = !st.closed;
        st.closed = true;
        if first {
            tracing::trace!(limit = st.limit, epoch = st.epoch, "work range closed");
        }
        first
    }

    /// Rewind the cursor to 0 for a new run, keeping limit and close state.
    pub fn rewind(&self) {
        self.lock().cursor = 0;
    }

    /// Reset for a fresh dynamic run: limit back to `limit`, cursor 0, open.
    ///
    /// Producer handles from earlier runs are detached. Must only be called
    /// while no worker is attached.
    pub fn reopen(&self, limit: usize) {
        let mut st = self.lock();
        st.limit = limit;
        st.cursor = 0;
        st.closed = false;
        st.producers = 0;
        st.epoch = st.epoch.wrapping_add(1);
    }

    /// Replace the limit. Must only be called while no worker is attached.
    pub fn set_limit(&self, limit: usize) {
        let mut st = self.lock();
        st.limit = limit;
        st.cursor = st.cursor.min(limit);
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> RangeSnapshot {
        let st = self.lock();
        RangeSnapshot {
            limit: st.limit,
            cursor: st.cursor,
            closed: st.closed,
            producers: st.producers,
        }
    }

    /// Register a producer handle. Returns the run it belongs to.
    pub(crate) fn attach_producer(&self) -> u64 {
        let mut st = self.lock();
        st.producers += 1;
        st.epoch
    }

    /// Whether run `epoch` is still current and open.
    pub(crate) fn is_open_in(&self, epoch: u64) -> bool {
        let st = self.lock();
        st.epoch == epoch && !st.closed
    }

    /// Close on behalf of a producer attached in run `epoch`.
    pub(crate) fn close_in(&self, epoch: u64) {
        let mut st = self.lock();
        if st.epoch != epoch {
            return;
        }
        Self::close_locked(&mut st);
        drop(st);
        self.cv.notify_all();
    }

    /// Unregister a producer handle. The last one out closes the range.
    pub(crate) fn detach_producer(&self, epoch: u64) {
        let mut st = self.lock();
        if st.epoch != epoch {
            return;
        }
        debug_assert!(st.producers > 0, "producer detach without attach");
        st.producers = st.producers.saturating_sub(1);
        if st.producers == 0 && Self::close_locked(&mut st) {
            drop(st);
            self.cv.notify_all();
        }
    }

    /// Close only when no producer handle is alive.
    ///
    /// Used by `join()`: a caller that fed the range through the scheduler
    /// itself and forgot `close()` still terminates, while a live producer on
    /// another thread keeps the run open until it closes or drops.
    pub(crate) fn close_if_unowned(&self) -> bool {
        let mut st = self.lock();
        let unowned = st.producers == 0;
        if unowned {
            Self::close_locked(&mut st);
        }
        drop(st);
        if unowned {
            self.cv.notify_all();
        }
        unowned
    }

    /// Cut the range at the current cursor and close it, so attached workers
    /// exit after their in-flight item. Returns the previous limit.
    pub(crate) fn truncate_and_close(&self) -> usize {
        let mut st = self.lock();
        let prev = st.limit;
        st.limit = st.cursor;
        st.closed = true;
        drop(st);
        self.cv.notify_all();
        prev
    }
}

// ---------------------------------------------------------------------------
// Loom concurrency tests
// ---------------------------------------------------------------------------
