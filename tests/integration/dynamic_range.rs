use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use workrange::{
    current_worker_id, LinePrinter, RangeMode, RunObserver, Scheduler, SchedulerConfig,
    SchedulerError,
};

use crate::common::SeenSet;

#[test]
fn grows_to_five_then_closes() {
    let seen = Arc::new(SeenSet::new(5));
    let mut s = Scheduler::dynamic(Arc::clone(&seen), 0, 4);
    s.start().unwrap();
    for expected in 1..=5 {
        assert_eq!(s.extend_limit().unwrap(), expected);
    }
    s.close().unwrap();
    let report = s.join().unwrap();

    assert_eq!(report.mode, RangeMode::Dynamic);
    assert_eq!(report.total_claims, 5);
    seen.assert_exactly_once(5);
}

#[test]
fn join_waits_for_close_from_producer() {
    let seen = Arc::new(SeenSet::new(5));
    let closed = Arc::new(AtomicBool::new(false));
    let mut s = Scheduler::dynamic(Arc::clone(&seen), 0, 3);
    s.start().unwrap();
    let producer = s.producer().unwrap();

    let closed2 = Arc::clone(&closed);
    let joiner = thread::spawn(move || {
        let report = s.join().unwrap();
        assert!(
            closed2.load(Ordering::SeqCst),
            "join returned before the producer closed the range"
        );
        report
    });

    for _ in 0..5 {
        // Workers go idle between extensions
        thread::sleep(Duration::from_millis(20));
        producer.extend().unwrap();
    }
    thread::sleep(Duration::from_millis(20));
    closed.store(true, Ordering::SeqCst);
    producer.close();

    let report = joiner.join().unwrap();
    assert_eq!(report.total_claims, 5);
    seen.assert_exactly_once(5);
}

#[test]
fn idle_workers_do_not_exit_early() {
    let seen = Arc::new(SeenSet::new(12));
    let mut s = Scheduler::dynamic(Arc::clone(&seen), 0, 6);
    s.start().unwrap();

    // Longer than any spin or timed wait a broken loop might use.
    thread::sleep(Duration::from_millis(100));
    for _ in 0..12 {
        s.extend_limit().unwrap();
        thread::sleep(Duration::from_millis(5));
    }
    s.close().unwrap();

    let report = s.join().unwrap();
    assert_eq!(report.total_claims, 12);
    seen.assert_exactly_once(12);
}

#[test]
fn producer_on_another_thread_and_drop_closes() {
    let seen = Arc::new(SeenSet::new(300));
    let mut s = Scheduler::dynamic(Arc::clone(&seen), 0, 4);
    s.start().unwrap();

    let producer = s.producer().unwrap();
    let feeder = thread::spawn(move || {
        for _ in 0..30 {
            producer.extend_by(10).unwrap();
        }
        // Dropping the only handle closes the range.
    });
    feeder.join().unwrap();

    let report = s.join().unwrap();
    assert_eq!(report.total_claims, 300);
    seen.assert_exactly_once(300);
}

#[test]
fn cloned_producers_keep_range_open_until_last_drop() {
    let seen = Arc::new(SeenSet::new(40));
    let mut s = Scheduler::dynamic(Arc::clone(&seen), 0, 2);
    s.start().unwrap();

    let p = s.producer().unwrap();
    let feeders: Vec<_> = (0..4)
        .map(|_| {
            let p = p.clone();
            thread::spawn(move || {
                for _ in 0..10 {
                    p.extend().unwrap();
                    thread::sleep(Duration::from_millis(1));
                }
            })
        })
        .collect();
    drop(p);
    for f in feeders {
        f.join().unwrap();
    }

    assert_eq!(s.join().unwrap().total_claims, 40);
    seen.assert_exactly_once(40);
}

#[test]
fn extend_after_close_is_an_error() {
    let mut s = Scheduler::dynamic(Arc::new(|_i: usize| {}), 0, 2);
    s.start().unwrap();
    s.extend_limit().unwrap();
    s.close().unwrap();
    s.close().unwrap();
    assert!(matches!(s.extend_limit(), Err(SchedulerError::Closed)));
    assert_eq!(s.join().unwrap().total_claims, 1);
}

#[test]
fn initial_limit_is_processed_before_extension() {
    let seen = Arc::new(SeenSet::new(13));
    let mut s = Scheduler::dynamic(Arc::clone(&seen), 10, 3);
    s.start().unwrap();
    s.extend_limit_by(3).unwrap();
    assert_eq!(s.join().unwrap().total_claims, 13);
    seen.assert_exactly_once(13);
}

#[test]
fn observer_sees_every_worker_once() {
    let printer = Arc::new(LinePrinter::new(Vec::new()));
    let observer: Arc<dyn RunObserver> = Arc::clone(&printer) as Arc<dyn RunObserver>;
    let cfg = SchedulerConfig::default().threads(3).dynamic().observer(observer);

    let mut s = Scheduler::new(Arc::new(|_i: usize| {}), 0, cfg).unwrap();
    s.start().unwrap();
    s.extend_limit_by(30).unwrap();
    let report = s.join().unwrap();
    drop(s);

    let printer = Arc::try_unwrap(printer).expect("scheduler released the observer");
    let text = String::from_utf8(printer.into_inner()).unwrap();
    let mut lines: Vec<_> = text.lines().map(str::to_owned).collect();
    lines.sort();

    let mut expected: Vec<_> = report
        .workers
        .iter()
        .map(|w| format!("worker {} claimed: {}", w.worker_id, w.claims))
        .collect();
    expected.sort();
    assert_eq!(lines, expected);
}

#[test]
fn per_worker_slots_via_worker_id() {
    let slots: Arc<Vec<Mutex<u64>>> = Arc::new((0..4).map(|_| Mutex::new(0)).collect());
    let s2 = Arc::clone(&slots);
    let mut s = Scheduler::dynamic(
        Arc::new(move |i: usize| {
            let id = current_worker_id().unwrap();
            *s2[id].lock().unwrap() += i as u64;
        }),
        0,
        4,
    );
    s.start().unwrap();
    s.extend_limit_by(100).unwrap();
    s.close().unwrap();
    s.join().unwrap();

    let total: u64 = slots.iter().map(|m| *m.lock().unwrap()).sum();
    assert_eq!(total, 4950);
}

#[test]
fn producer_from_previous_run_is_inert() {
    let mut s = Scheduler::dynamic(Arc::new(|_i: usize| {}), 0, 2);
    s.start().unwrap();
    let stale = s.producer().unwrap();
    stale.extend_by(3).unwrap();
    stale.close();
    assert_eq!(s.join().unwrap().total_claims, 3);

    s.start().unwrap();
    assert!(matches!(stale.extend(), Err(SchedulerError::Closed)));
    drop(stale);
    // Still open: the stale drop did not close this run.
    s.extend_limit_by(4).unwrap();
    s.close().unwrap();
    assert_eq!(s.join().unwrap().total_claims, 4);
}
