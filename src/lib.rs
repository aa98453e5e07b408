//! Dynamic work distribution over a shared index cursor.
//!
//! ## Scope
//! A fixed pool of worker threads pulls integer indices from one shared
//! cursor and calls a user-supplied [`WorkContract`] for each. Fast items let
//! a worker come back for more, so non-uniform workloads (image rows, file
//! chunks, decoded blocks) balance at runtime instead of by static partition.
//!
//! ## Key invariants
//! - Every index in `[0, limit)` is processed exactly once per run.
//! - Static claims never block. Dynamic claims block only while the range is
//!   drained and still open.
//! - A dynamic worker exits only after observing the close signal.
//! - A scheduler is re-runnable: `start()` rewinds, `join()` drops every
//!   handle.
//!
//! ## Flow
//! `Scheduler::new -> start -> [extend_limit* -> close] -> join -> RunReport`
//!
//! ## Notable entry points
//! - [`Scheduler`] / [`SchedulerConfig`]: owned, re-runnable pool.
//! - [`RangeProducer`]: feeds a dynamic run from another thread.
//! - [`for_each_index`]: one borrowing static pass.
//! - [`harness`]: sleep workloads, baselines and timers used by the demo CLI
//!   and benches.
//!
//! The library emits `tracing` events but never installs a subscriber.

pub mod harness;
pub mod scheduler;

pub use scheduler::{
    current_worker_id, for_each_index, resolve_threads, ClaimCursor, LinePrinter, RangeMode,
    RangeProducer, RangeSnapshot, RunObserver, RunReport, Scheduler, SchedulerConfig,
    SchedulerError, TracingObserver, WorkContract, WorkerReport, ENV_THREADS, ENV_THREAD_NAME,
};
