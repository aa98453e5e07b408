use std::collections::HashMap;
use std::panic;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use workrange::{Scheduler, SchedulerConfig, SchedulerError, ENV_THREADS, ENV_THREAD_NAME};

use crate::common::SeenSet;

#[test]
fn rerun_has_no_residue() {
    let seen = Arc::new(SeenSet::new(100));
    let mut s = Scheduler::with_threads(Arc::clone(&seen), 100, 4);

    let first = s.run().unwrap();
    assert_eq!(first.total_claims, 100);
    seen.assert_exactly_once(100);

    seen.reset();
    let second = s.run().unwrap();
    assert_eq!(second.total_claims, 100);
    assert_eq!(second.worker_count(), 4);
    seen.assert_exactly_once(100);
}

#[test]
fn rerun_with_different_limit() {
    let seen = Arc::new(SeenSet::new(64));
    let mut s = Scheduler::with_threads(Arc::clone(&seen), 64, 3);
    s.run().unwrap();
    seen.assert_exactly_once(64);

    seen.reset();
    s.set_limit(17).unwrap();
    assert_eq!(s.run().unwrap().total_claims, 17);
    seen.assert_exactly_once(17);
}

#[test]
fn misuse_fails_loudly() {
    let mut s = Scheduler::with_threads(Arc::new(|_i: usize| {}), 10, 2);
    assert!(matches!(s.join(), Err(SchedulerError::NotRunning)));
    assert!(matches!(
        s.extend_limit(),
        Err(SchedulerError::StaticRange { .. })
    ));
    assert!(matches!(s.close(), Err(SchedulerError::StaticRange { .. })));

    s.start().unwrap();
    assert!(matches!(s.start(), Err(SchedulerError::AlreadyRunning)));
    assert!(matches!(s.set_limit(1), Err(SchedulerError::AlreadyRunning)));
    s.join().unwrap();
    assert!(matches!(s.join(), Err(SchedulerError::NotRunning)));
}

#[test]
fn error_messages_name_the_operation() {
    let s = Scheduler::with_threads(Arc::new(|_i: usize| {}), 1, 1);
    let err = s.producer().unwrap_err();
    assert_eq!(
        err.to_string(),
        "producer() requires a dynamic-range scheduler"
    );
}

#[test]
fn panic_surfaces_and_scheduler_recovers() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c2 = Arc::clone(&calls);
    let armed = Arc::new(AtomicUsize::new(1));
    let a2 = Arc::clone(&armed);
    let mut s = Scheduler::with_threads(
        Arc::new(move |i: usize| {
            if i == 0 && a2.swap(0, Ordering::SeqCst) == 1 {
                panic!("intentional test panic");
            }
            c2.fetch_add(1, Ordering::Relaxed);
        }),
        50,
        3,
    );

    s.start().unwrap();
    let joined = panic::catch_unwind(panic::AssertUnwindSafe(|| s.join()));
    assert!(joined.is_err(), "worker panic must reach the caller");
    assert!(!s.is_running());
    assert_eq!(calls.load(Ordering::Relaxed), 49);

    // Disarmed: the next run is clean.
    calls.store(0, Ordering::Relaxed);
    assert_eq!(s.run().unwrap().total_claims, 50);
    assert_eq!(calls.load(Ordering::Relaxed), 50);
}

#[test]
fn dropping_a_running_dynamic_scheduler_terminates() {
    let seen = Arc::new(SeenSet::new(8));
    {
        let mut s = Scheduler::dynamic(Arc::clone(&seen), 0, 4);
        s.start().unwrap();
        s.extend_limit_by(8).unwrap();
    }
    seen.assert_exactly_once(8);
}

#[test]
fn into_work_after_run() {
    let seen = Arc::new(SeenSet::new(9));
    let mut s = Scheduler::with_threads(Arc::clone(&seen), 9, 2);
    s.run().unwrap();
    let back = s.into_work();
    assert!(Arc::ptr_eq(&back, &seen));
    back.assert_exactly_once(9);
}

#[test]
fn config_reads_variable_source() {
    let vars = HashMap::from([
        (ENV_THREADS, "3".to_string()),
        (ENV_THREAD_NAME, "envpool".to_string()),
    ]);
    let cfg = SchedulerConfig::from_lookup(|key| vars.get(key).cloned());

    assert_eq!(cfg.threads, 3);
    assert_eq!(cfg.thread_name, "envpool");
    let s = Scheduler::new(Arc::new(|_i: usize| {}), 0, cfg).unwrap();
    assert_eq!(s.threads(), 3);
}

#[test]
fn zero_threads_uses_hardware_parallelism() {
    let expected = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let s = Scheduler::with_threads(Arc::new(|_i: usize| {}), 0, 0);
    assert_eq!(s.threads(), expected);
}
