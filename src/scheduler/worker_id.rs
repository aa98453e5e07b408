//! Thread-local id of the scheduler worker running on this thread.
//!
//! Lets a [`WorkContract`](super::WorkContract) keep per-worker output slots
//! (for example one accumulator per worker, merged after `join()`) without
//! any synchronization on the hot path.
//!
//! # Correctness Invariant
//!
//! `current_worker_id()` returns `Some(id)` **only** while a scheduler worker
//! is inside its claim loop. The id is installed through [`WorkerIdGuard`],
//! which clears it on drop, including during panic unwinding. Any other
//! thread (main, producer, tests) sees `None`.

use std::cell::Cell;

/// Sentinel value indicating no worker ID is set.
const NO_WORKER: usize = usize::MAX;

thread_local! {
    static WORKER_ID: Cell<usize> = const { Cell::new(NO_WORKER) };
}

/// Id of the scheduler worker executing on this thread, if any.
///
/// Ids are dense in `0..threads` for the run that spawned the worker.
#[inline]
pub fn current_worker_id() -> Option<usize> {
    WORKER_ID.with(|c| {
        let v = c.get();
        if v == NO_WORKER {
            None
        } else {
            Some(v)
        }
    })
}

/// Installs a worker id for the current thread; restores the previous value
/// on drop.
#[derive(Debug)]
#[must_use = "the worker id is cleared when the guard drops"]
pub(crate) struct WorkerIdGuard {
    prev: usize,
}

impl WorkerIdGuard {
    pub(crate) fn enter(worker_id: usize) -> Self {
        debug_assert_ne!(worker_id, NO_WORKER, "worker id collides with sentinel");
        let prev = WORKER_ID.with(|c| c.replace(worker_id));
        Self { prev }
    }
}

impl Drop for WorkerIdGuard {
    fn drop(&mut self) {
        WORKER_ID.with(|c| c.set(self.prev));
    }
}
