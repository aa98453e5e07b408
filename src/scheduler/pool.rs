//! Range Scheduler: fixed thread pool draining a shared cursor
//!
//! # Architecture
//!
//! ```text
//!                  ┌────────────────────────────────────────────────────┐
//!                  │                     Scheduler                      │
//!                  │                                                    │
//!  Producer ───────┼──► extend()/close() ──► ClaimCursor                │
//!  (any thread)    │                         { limit, cursor, closed }  │
//!                  │                         Mutex + Condvar            │
//!                  │                              ▲                     │
//!                  │             claim_next[_blocking]()                │
//!                  │        ┌─────────────┬───────┴──────┬──────────┐   │
//!                  │        │  Worker 0   │   Worker 1   │ Worker N │   │
//!                  │        │  claims: u64│  claims: u64 │   ...    │   │
//!                  │        └──────┬──────┴──────┬───────┴────┬─────┘   │
//!                  │               ▼             ▼            ▼         │
//!                  │            WorkContract::process(index)            │
//!                  └────────────────────────────────────────────────────┘
//! ```
//!
//! - N OS threads per run, spawned by `start()`, joined by `join()`
//! - Each worker loops: claim index, process it, repeat until `None`
//! - Static mode claims never block; dynamic mode claims park on the condvar
//!   until work arrives or the range closes
//! - Per-worker claim counts come back through the join handles
//!
//! # Correctness Invariants
//!
//! - **Exactly once**: every index in `[0, limit)` is processed once per run
//! - **Re-runnable**: `start()` rewinds the cursor; `join()` drops every
//!   handle, so sequential runs share no residue
//! - **Loud misuse**: `start()` twice, `join()` without `start()`, and
//!   dynamic operations on a static scheduler return errors
//! - **Panics surface**: a panicking contract unwinds its worker; `join()`
//!   joins the rest, then re-raises the first panic
//!
//! # What This Does NOT Do
//!
//! - Work stealing, priorities, cancellation of in-flight items, or result
//!   aggregation. Contracts own their outputs.

use std::any::Any;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use super::config::{RangeMode, SchedulerConfig, PRESIZE_WORKERS_MAX};
use super::contract::WorkContract;
use super::cursor::ClaimCursor;
use super::error::SchedulerError;
use super::metrics::{RunReport, WorkerReport};
use super::observer::RunObserver;
use super::producer::RangeProducer;
use super::worker_id::WorkerIdGuard;

/// Dynamic work-distribution scheduler.
///
/// # Type Parameters
///
/// - `W`: the work contract. Held as `Arc<W>` so the caller keeps access to
///   whatever the contract writes (via [`Scheduler::work`]) after `join()`.
///
/// # Lifecycle
///
/// 1. Construct with [`Scheduler::new`] (or [`Scheduler::with_threads`] /
///    [`Scheduler::dynamic`])
/// 2. `start()` spawns the workers
/// 3. Dynamic mode: `extend_limit()` any number of times, then `close()`
/// 4. `join()` waits for the workers and returns the run's [`RunReport`]
/// 5. Optionally `set_limit()` and go to 2
///
/// # Example
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use workrange::{Scheduler, SchedulerConfig};
///
/// let sum = Arc::new(AtomicUsize::new(0));
/// let s2 = Arc::clone(&sum);
/// let work = Arc::new(move |i: usize| {
///     s2.fetch_add(i, Ordering::Relaxed);
/// });
///
/// let mut sched = Scheduler::new(work, 100, SchedulerConfig::default().threads(4))?;
/// sched.start()?;
/// let report = sched.join()?;
///
/// assert_eq!(report.total_claims, 100);
/// assert_eq!(sum.load(Ordering::Relaxed), 4950);
/// # Ok::<(), workrange::SchedulerError>(())
/// ```
pub struct Scheduler<W: ?Sized> {
    work: Arc<W>,
    cursor: Arc<ClaimCursor>,
    mode: RangeMode,
    /// Resolved at construction; never re-queried.
    threads: usize,
    /// Dynamic runs reopen at this limit after `join()`.
    initial_limit: usize,
    thread_name: String,
    stack_size: Option<usize>,
    observer: Option<Arc<dyn RunObserver>>,
    workers: Vec<JoinHandle<WorkerReport>>,
    started_at: Option<Instant>,
}

impl<W: ?Sized> std::fmt::Debug for Scheduler<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("mode", &self.mode)
            .field("threads", &self.threads)
            .field("range", &self.cursor.snapshot())
            .field("running", &!self.workers.is_empty())
            .finish()
    }
}

impl<W> Scheduler<W>
where
    W: WorkContract + ?Sized + 'static,
{
    /// Create a scheduler over `[0, limit)`.
    ///
    /// The thread count is resolved here (see
    /// [`resolve_threads`](super::resolve_threads)) and reused by every run.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::InvalidConfig`] if `cfg` fails validation.
    pub fn new(work: Arc<W>, limit: usize, cfg: SchedulerConfig) -> Result<Self, SchedulerError> {
        cfg.validate()?;
        Ok(Self::from_valid(work, limit, cfg))
    }

    /// Static-range scheduler with `threads` workers (0 = hardware parallelism).
    pub fn with_threads(work: Arc<W>, limit: usize, threads: usize) -> Self {
        Self::from_valid(work, limit, SchedulerConfig::default().threads(threads))
    }

    /// Dynamic-range scheduler with `threads` workers (0 = hardware
    /// parallelism), starting at `initial_limit`.
    pub fn dynamic(work: Arc<W>, initial_limit: usize, threads: usize) -> Self {
        Self::from_valid(
            work,
            initial_limit,
            SchedulerConfig::default().threads(threads).dynamic(),
        )
    }

    fn from_valid(work: Arc<W>, limit: usize, cfg: SchedulerConfig) -> Self {
        let threads = cfg.resolved_threads();
        Self {
            work,
            cursor: Arc::new(ClaimCursor::new(limit)),
            mode: cfg.mode,
            threads,
            initial_limit: limit,
            thread_name: cfg.thread_name,
            stack_size: cfg.stack_size,
            observer: cfg.observer,
            workers: Vec::new(),
            started_at: None,
        }
    }

    /// The work contract shared with the workers.
    #[inline]
    pub fn work(&self) -> &Arc<W> {
        &self.work
    }

    /// Hand the work contract back, joining any run still in progress.
    pub fn into_work(self) -> Arc<W> {
        let work = Arc::clone(&self.work);
        drop(self);
        work
    }

    /// Resolved worker count.
    #[inline]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Range mode chosen at construction.
    #[inline]
    pub fn mode(&self) -> RangeMode {
        self.mode
    }

    /// Current exclusive limit (snapshot).
    pub fn limit(&self) -> usize {
        self.cursor.snapshot().limit
    }

    /// Whether workers from a `start()` are still held.
    #[inline]
    pub fn is_running(&self) -> bool {
        !self.workers.is_empty()
    }

    /// Replace the limit for the next run.
    ///
    /// In dynamic mode this also becomes the limit the range reopens at after
    /// each `join()`.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::AlreadyRunning`] while a run is in progress.
    pub fn set_limit(&mut self, limit: usize) -> Result<(), SchedulerError> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }
        self.cursor.set_limit(limit);
        self.initial_limit = limit;
        Ok(())
    }

    /// Spawn the worker threads.
    ///
    /// Rewinds the cursor to 0 so the same scheduler can process sequential
    /// batches. Returns once every worker is spawned, not when work is done.
    ///
    /// # Errors
    ///
    /// - [`SchedulerError::AlreadyRunning`] if the previous run was not joined.
    /// - [`SchedulerError::Spawn`] if the OS refuses a thread. Workers already
    ///   spawned are stopped after their in-flight item and joined first.
    pub fn start(&mut self) -> Result<(), SchedulerError> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cursor.rewind();
        self.started_at = Some(Instant::now());
        self.workers.reserve(self.threads.min(PRESIZE_WORKERS_MAX));

        for worker_id in 0..self.threads {
            let mut builder =
                thread::Builder::new().name(format!("{}-{}", self.thread_name, worker_id));
            if let Some(bytes) = self.stack_size {
                builder = builder.stack_size(bytes);
            }

            let worker = Worker {
                worker_id,
                mode: self.mode,
                cursor: Arc::clone(&self.cursor),
                work: Arc::clone(&self.work),
                observer: self.observer.clone(),
            };

            match builder.spawn(move || worker.run()) {
                Ok(handle) => self.workers.push(handle),
                Err(source) => {
                    tracing::error!(worker_id, error = %source, "failed to spawn worker");
                    self.abort_partial_start();
                    return Err(SchedulerError::Spawn { worker_id, source });
                }
            }
        }

        tracing::debug!(
            threads = self.threads,
            mode = %self.mode,
            limit = self.limit(),
            "workers started"
        );
        Ok(())
    }

    /// Wait for every worker to finish and return the run's counters.
    ///
    /// In dynamic mode, if no [`RangeProducer`] handle is alive the range is
    /// closed first (an implicit "producer is done"). With a live producer,
    /// `join()` waits until that producer closes the range or drops. See
    /// [Producer Runs](super::cursor#producer-runs).
    ///
    /// # Errors
    ///
    /// [`SchedulerError::NotRunning`] without a matching `start()`.
    ///
    /// # Panics
    ///
    /// If a work contract panicked on any worker, the first panic is re-raised
    /// here after all workers have been joined. The scheduler is left idle and
    /// can be started again.
    pub fn join(&mut self) -> Result<RunReport, SchedulerError> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        if self.mode == RangeMode::Dynamic && !self.cursor.close_if_unowned() {
            tracing::debug!("join waiting for live producers to close the range");
        }

        let mut report = RunReport::new(self.mode);
        let panic = self.join_workers(&mut report);

        if self.mode == RangeMode::Dynamic {
            self.cursor.reopen(self.initial_limit);
        }
        report.elapsed = self
            .started_at
            .take()
            .map(|t| t.elapsed())
            .unwrap_or_default();

        if let Some(observer) = &self.observer {
            observer.on_run_complete(&report);
        }
        tracing::debug!(
            total_claims = report.total_claims,
            max_claims = report.max_claims(),
            min_claims = report.min_claims(),
            elapsed_us = report.elapsed.as_micros() as u64,
            "run joined"
        );

        if let Some(p) = panic {
            std::panic::resume_unwind(p);
        }
        Ok(report)
    }

    /// `start()` then `join()`.
    pub fn run(&mut self) -> Result<RunReport, SchedulerError> {
        self.start()?;
        self.join()
    }

    /// Make one more index claimable (dynamic mode). Returns the new limit.
    ///
    /// Valid at any time after construction, including before `start()`.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::StaticRange`] in static mode, [`SchedulerError::Closed`]
    /// after `close()`.
    pub fn extend_limit(&self) -> Result<usize, SchedulerError> {
        self.extend_limit_by(1)
    }

    /// Make `by` more indices claimable (dynamic mode). Returns the new limit.
    ///
    /// # Errors
    ///
    /// As [`extend_limit`](Self::extend_limit), plus
    /// [`SchedulerError::LimitOverflow`].
    pub fn extend_limit_by(&self, by: usize) -> Result<usize, SchedulerError> {
        self.require_dynamic("extend_limit")?;
        self.cursor.extend(by)
    }

    /// Signal that no more work is coming this run (dynamic mode). Idempotent.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::StaticRange`] in static mode.
    pub fn close(&self) -> Result<(), SchedulerError> {
        self.require_dynamic("close")?;
        self.cursor.close();
        Ok(())
    }

    /// Handle for feeding this scheduler's range from another thread.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::StaticRange`] in static mode.
    pub fn producer(&self) -> Result<RangeProducer, SchedulerError> {
        self.require_dynamic("producer")?;
        Ok(RangeProducer::attach(Arc::clone(&self.cursor)))
    }

    fn require_dynamic(&self, op: &'static str) -> Result<(), SchedulerError> {
        match self.mode {
            RangeMode::Dynamic => Ok(()),
            RangeMode::Static => Err(SchedulerError::StaticRange { op }),
        }
    }

    /// Join every held worker, merging reports. Returns the first panic.
    fn join_workers(&mut self, report: &mut RunReport) -> Option<Box<dyn Any + Send + 'static>> {
        let mut first_panic = None;
        for (worker_id, handle) in self.workers.drain(..).enumerate() {
            match handle.join() {
                Ok(w) => report.merge_worker(w),
                Err(p) => {
                    tracing::error!(worker_id, "worker panicked in work contract");
                    if first_panic.is_none() {
                        first_panic = Some(p);
                    }
                }
            }
        }
        first_panic
    }

    /// Stop and join the workers of a start that failed midway, then restore
    /// the range so the scheduler can be started again.
    fn abort_partial_start(&mut self) {
        let limit = self.cursor.truncate_and_close();
        let mut discard = RunReport::new(self.mode);
        if let Some(p) = self.join_workers(&mut discard) {
            tracing::warn!(
                panic = panic_message(p.as_ref()),
                "worker panicked during aborted start"
            );
        }
        self.cursor.reopen(limit);
        self.started_at = None;
    }
}

impl<W: ?Sized> Drop for Scheduler<W> {
    fn drop(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        tracing::warn!(
            workers = self.workers.len(),
            "scheduler dropped while running; closing range and joining workers"
        );
        if self.mode == RangeMode::Dynamic {
            self.cursor.close();
        }
        for handle in self.workers.drain(..) {
            // A panic here was never observed by join(); swallow it rather
            // than abort through a double panic.
            let _ = handle.join();
        }
    }
}

/// One worker's state, moved onto its thread.
struct Worker<W: ?Sized> {
    worker_id: usize,
    mode: RangeMode,
    cursor: Arc<ClaimCursor>,
    work: Arc<W>,
    observer: Option<Arc<dyn RunObserver>>,
}

impl<W: WorkContract + ?Sized> Worker<W> {
    /// Claim/process loop.
    ///
    /// Exits when the cursor returns `None`: immediately at the limit in
    /// static mode, only after close in dynamic mode.
    fn run(self) -> WorkerReport {
        let _id = WorkerIdGuard::enter(self.worker_id);
        let started = Instant::now();
        let mut claims = 0u64;

        loop {
            let next = match self.mode {
                RangeMode::Static => self.cursor.claim_next(),
                RangeMode::Dynamic => self.cursor.claim_next_blocking(),
            };
            let Some(index) = next else { break };
            claims += 1;
            self.work.process(index);
        }

        let report = WorkerReport {
            worker_id: self.worker_id,
            claims,
            elapsed: started.elapsed(),
        };
        if let Some(observer) = &self.observer {
            observer.on_worker_exit(&report);
        }
        report
    }
}

fn panic_message(p: &(dyn Any + Send)) -> &str {
    if let Some(s) = p.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = p.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}

// ============================================================================
// Tests
// ============================================================================
