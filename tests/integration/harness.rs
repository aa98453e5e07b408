use std::sync::Arc;
use std::time::Duration;

use workrange::harness::{
    run_generated, run_partitioned, run_sequential, timed, SleepTable, UniformSleep,
};
use workrange::{Scheduler, SchedulerConfig};

use crate::common::SeenSet;

#[test]
fn scheduler_beats_single_thread_on_uniform_sleep() {
    let work = Arc::new(UniformSleep::new(Duration::from_millis(10)));

    let (_, single) = timed(|| run_sequential(work.as_ref(), 16));
    let mut s = Scheduler::with_threads(Arc::clone(&work), 16, 8);
    let (report, sched) = timed(|| s.run());
    report.unwrap();

    assert!(single.wall >= Duration::from_millis(160));
    assert!(sched.wall < single.wall, "{sched} vs {single}");
}

#[test]
fn scheduler_bounded_by_longest_item() {
    let table = Arc::new(SleepTable::from_millis(vec![80, 5, 5, 5, 5, 5, 5, 5]));
    let mut s = Scheduler::with_threads(Arc::clone(&table), 8, 8);
    let (report, t) = timed(|| s.run());
    report.unwrap();
    assert!(t.wall >= table.longest());
}

#[test]
fn baselines_cover_range() {
    let seen = SeenSet::new(80);
    run_sequential(&seen, 80);
    seen.assert_exactly_once(80);

    seen.reset();
    let counts = run_partitioned(&seen, 80, 8).unwrap();
    assert_eq!(counts, vec![10; 8]);
    seen.assert_exactly_once(80);
}

#[test]
fn generated_work_runs_every_item() {
    let seen = Arc::new(SeenSet::new(40));
    let report = run_generated(
        Arc::clone(&seen),
        40,
        Duration::ZERO,
        SchedulerConfig::default().threads(8),
    )
    .unwrap();
    assert_eq!(report.total_claims, 40);
    seen.assert_exactly_once(40);
}
