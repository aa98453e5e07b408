//! Strategies compared by the demo: the shared-cursor scheduler and the two
//! baselines it is measured against.
//!
//! | Strategy        | Balancing                                   |
//! |-----------------|---------------------------------------------|
//! | `sequential`    | none; one thread, index order               |
//! | `partitioned`   | static: `limit / threads` contiguous ranges |
//! | scheduler       | dynamic: each idle worker claims the next   |
//! | `generated`     | dynamic, with the limit grown by a producer |

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::scheduler::{
    resolve_threads, RunReport, Scheduler, SchedulerConfig, SchedulerError, WorkContract,
};

/// Process `[0, limit)` in order on the calling thread.
pub fn run_sequential<W: WorkContract + ?Sized>(work: &W, limit: usize) {
    for index in 0..limit {
        work.process(index);
    }
}

/// Split `[0, limit)` into `threads` contiguous ranges, one plain thread each.
///
/// The remainder of `limit / threads` goes to the last range. Returns the
/// number of items each thread processed, in thread order.
///
/// # Errors
///
/// [`SchedulerError::Spawn`] if a thread cannot be spawned. Threads already
/// running finish their range first.
pub fn run_partitioned<W>(
    work: &W,
    limit: usize,
    threads: usize,
) -> Result<Vec<usize>, SchedulerError>
where
    W: WorkContract + ?Sized,
{
    let ranges = partition(limit, resolve_threads(threads));

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(ranges.len());
        for (worker_id, range) in ranges.iter().cloned().enumerate() {
            let spawned = thread::Builder::new()
                .name(format!("partition-{worker_id}"))
                .spawn_scoped(scope, move || {
                    let n = range.len();
                    for index in range {
                        work.process(index);
                    }
                    n
                });
            match spawned {
                Ok(h) => handles.push(h),
                Err(source) => return Err(SchedulerError::Spawn { worker_id, source }),
            }
        }
        Ok(handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(n) => n,
                Err(p) => std::panic::resume_unwind(p),
            })
            .collect())
    })
}

/// Equal contiguous ranges covering `[0, limit)`; the last absorbs the
/// remainder.
pub fn partition(limit: usize, parts: usize) -> Vec<std::ops::Range<usize>> {
    let parts = parts.max(1);
    let per = limit / parts;
    (0..parts)
        .map(|i| {
            let start = i * per;
            let end = if i + 1 == parts { limit } else { start + per };
            start..end
        })
        .collect()
}

/// Dynamic run fed by the calling thread.
///
/// Starts a dynamic scheduler at limit 0, then sleeps `generate` before each
/// of `items` extensions (modelling a decoder that produces one block at a
/// time), closes the range and joins.
pub fn run_generated<W>(
    work: Arc<W>,
    items: usize,
    generate: Duration,
    cfg: SchedulerConfig,
) -> Result<RunReport, SchedulerError>
where
    W: WorkContract + ?Sized + 'static,
{
    let mut sched = Scheduler::new(work, 0, cfg.dynamic())?;
    sched.start()?;

    let producer = sched.producer()?;
    for _ in 0..items {
        if !generate.is_zero() {
            thread::sleep(generate);
        }
        producer.extend()?;
    }
    producer.close();
    drop(producer);

    sched.join()
}
