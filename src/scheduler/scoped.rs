//! Borrowing static run.
//!
//! [`for_each_index`] runs one static-range pass over a contract the caller
//! only lends. Workers live inside a [`std::thread::scope`], so the borrow
//! cannot outlive the call and no `Arc` is needed.

use std::thread;
use std::time::Instant;

use super::config::{resolve_threads, RangeMode, PRESIZE_WORKERS_MAX};
use super::contract::WorkContract;
use super::cursor::ClaimCursor;
use super::error::SchedulerError;
use super::metrics::{RunReport, WorkerReport};
use super::worker_id::WorkerIdGuard;

/// Call `work.process(i)` exactly once for every `i` in `[0, limit)` using
/// `threads` workers (0 = hardware parallelism).
///
/// Returns when every index has been processed.
///
/// # Errors
///
/// [`SchedulerError::Spawn`] if the OS refuses a thread. Workers already
/// running finish their in-flight item and exit before this returns.
///
/// # Panics
///
/// Re-raises the first panic from `work` after all workers have exited.
///
/// # Example
///
/// ```
/// use std::sync::atomic::{AtomicU64, Ordering};
///
/// let total = AtomicU64::new(0);
/// let report = workrange::for_each_index(
///     &|i: usize| {
///         total.fetch_add(i as u64, Ordering::Relaxed);
///     },
///     1000,
///     4,
/// )?;
/// assert_eq!(report.total_claims, 1000);
/// assert_eq!(total.into_inner(), 499_500);
/// # Ok::<(), workrange::SchedulerError>(())
/// ```
pub fn for_each_index<W>(
    work: &W,
    limit: usize,
    threads: usize,
) -> Result<RunReport, SchedulerError>
where
    W: WorkContract + ?Sized,
{
    let threads = resolve_threads(threads);
    let cursor = ClaimCursor::new(limit);
    let started = Instant::now();

    let mut report = RunReport::new(RangeMode::Static);
    let mut first_panic = None;
    let mut spawn_err = None;

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(threads.min(PRESIZE_WORKERS_MAX));
        for worker_id in 0..threads {
            let cursor = &cursor;
            let spawned = thread::Builder::new()
                .name(format!("workrange-scoped-{worker_id}"))
                .spawn_scoped(scope, move || drain(work, cursor, worker_id));
            match spawned {
                Ok(h) => handles.push(h),
                Err(source) => {
                    tracing::error!(worker_id, error = %source, "failed to spawn scoped worker");
                    cursor.truncate_and_close();
                    spawn_err = Some(SchedulerError::Spawn { worker_id, source });
                    break;
                }
            }
        }

        for h in handles {
            match h.join() {
                Ok(w) => report.merge_worker(w),
                Err(p) => {
                    if first_panic.is_none() {
                        first_panic = Some(p);
                    }
                }
            }
        }
    });

    if let Some(p) = first_panic {
        std::panic::resume_unwind(p);
    }
    if let Some(err) = spawn_err {
        return Err(err);
    }

    report.elapsed = started.elapsed();
    tracing::debug!(
        threads,
        limit,
        total_claims = report.total_claims,
        "scoped run complete"
    );
    Ok(report)
}

fn drain<W>(work: &W, cursor: &ClaimCursor, worker_id: usize) -> WorkerReport
where
    W: WorkContract + ?Sized,
{
    let _id = WorkerIdGuard::enter(worker_id);
    let started = Instant::now();
    let mut claims = 0u64;
    while let Some(index) = cursor.claim_next() {
        claims += 1;
        work.process(index);
    }
    WorkerReport {
        worker_id,
        claims,
        elapsed: started.elapsed(),
    }
}
