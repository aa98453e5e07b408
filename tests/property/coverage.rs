//! Property tests: every index in `[0, L)` is processed exactly once, for
//! arbitrary limits, thread counts and extension schedules.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use proptest::prelude::*;

use workrange::harness::partition;
use workrange::{for_each_index, Scheduler, WorkContract};

fn proptest_cases(default: u32) -> u32 {
    std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(|v: u32| v.max(1))
        .unwrap_or(default)
}

struct Hits(Vec<AtomicU32>);

impl Hits {
    fn new(n: usize) -> Self {
        Hits((0..n).map(|_| AtomicU32::new(0)).collect())
    }

    fn counts(&self) -> Vec<u32> {
        self.0.iter().map(|h| h.load(Ordering::Relaxed)).collect()
    }
}

impl WorkContract for Hits {
    fn process(&self, index: usize) {
        self.0[index].fetch_add(1, Ordering::Relaxed);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(proptest_cases(32)))]

    #[test]
    fn static_run_is_exactly_once(limit in 0usize..2_000, threads in 1usize..17) {
        let hits = Arc::new(Hits::new(limit));
        let mut s = Scheduler::with_threads(Arc::clone(&hits), limit, threads);
        let report = s.run().unwrap();

        prop_assert_eq!(report.total_claims, limit as u64);
        prop_assert_eq!(report.worker_count(), threads);
        prop_assert!(hits.counts().iter().all(|&c| c == 1));
    }

    #[test]
    fn scoped_run_is_exactly_once(limit in 0usize..2_000, threads in 1usize..17) {
        let hits = Hits::new(limit);
        let report = for_each_index(&hits, limit, threads).unwrap();
        prop_assert_eq!(report.total_claims, limit as u64);
        prop_assert!(hits.counts().iter().all(|&c| c == 1));
    }

    #[test]
    fn dynamic_run_is_exactly_once(
        initial in 0usize..50,
        batches in prop::collection::vec(0usize..40, 0..30),
        threads in 1usize..9,
    ) {
        let total = initial + batches.iter().sum::<usize>();
        let hits = Arc::new(Hits::new(total));
        let mut s = Scheduler::dynamic(Arc::clone(&hits), initial, threads);
        s.start().unwrap();
        for by in &batches {
            s.extend_limit_by(*by).unwrap();
        }
        s.close().unwrap();
        let report = s.join().unwrap();

        prop_assert_eq!(report.total_claims, total as u64);
        prop_assert!(hits.counts().iter().all(|&c| c == 1));
    }

    #[test]
    fn partition_is_a_cover(limit in 0usize..10_000, parts in 1usize..65) {
        let ranges = partition(limit, parts);
        prop_assert_eq!(ranges.len(), parts);
        let mut next = 0;
        for r in &ranges {
            prop_assert_eq!(r.start, next);
            next = r.end;
        }
        prop_assert_eq!(next, limit);
    }
}
