//! High-contention runs: many workers, many tiny items.

use std::sync::Arc;

use workrange::Scheduler;

use crate::common::SeenSet;

const THREADS: usize = 64;
const ITEMS: usize = 100_000;

#[test]
fn static_64_threads_100k_items() {
    let seen = Arc::new(SeenSet::new(ITEMS));
    let mut s = Scheduler::with_threads(Arc::clone(&seen), ITEMS, THREADS);
    let report = s.run().unwrap();

    assert_eq!(report.total_claims, ITEMS as u64);
    assert_eq!(report.worker_count(), THREADS);
    assert!(seen.duplicates().is_empty());
    seen.assert_exactly_once(ITEMS);
}

#[test]
fn dynamic_64_threads_100k_items_in_batches() {
    let seen = Arc::new(SeenSet::new(ITEMS));
    let mut s = Scheduler::dynamic(Arc::clone(&seen), 0, THREADS);
    s.start().unwrap();

    let producer = s.producer().unwrap();
    let mut added = 0;
    let mut batch = 1;
    while added < ITEMS {
        let by = batch.min(ITEMS - added);
        producer.extend_by(by).unwrap();
        added += by;
        // Alternate single-unit (notify_one) and bulk (notify_all) wakes.
        batch = if batch == 1 { 97 } else { 1 };
    }
    drop(producer);

    let report = s.join().unwrap();
    assert_eq!(report.total_claims, ITEMS as u64);
    assert!(seen.duplicates().is_empty());
    seen.assert_exactly_once(ITEMS);
}
