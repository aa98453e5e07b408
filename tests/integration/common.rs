use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;

use workrange::WorkContract;

/// Counts how often each index was processed.
#[derive(Debug)]
pub struct SeenSet {
    hits: Vec<AtomicU32>,
    calls: AtomicUsize,
}

impl SeenSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            hits: (0..capacity).map(|_| AtomicU32::new(0)).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn duplicates(&self) -> Vec<usize> {
        self.hits
            .iter()
            .enumerate()
            .filter(|(_, h)| h.load(Ordering::Relaxed) > 1)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn assert_exactly_once(&self, limit: usize) {
        assert_eq!(self.calls(), limit, "process() call count");
        for (i, h) in self.hits.iter().enumerate() {
            let h = h.load(Ordering::Relaxed);
            let want = u32::from(i < limit);
            assert_eq!(h, want, "index {i} processed {h} times, expected {want}");
        }
    }

    pub fn reset(&self) {
        for h in &self.hits {
            h.store(0, Ordering::Relaxed);
        }
        self.calls.store(0, Ordering::Relaxed);
    }
}

impl WorkContract for SeenSet {
    fn process(&self, index: usize) {
        self.hits[index].fetch_add(1, Ordering::Relaxed);
        self.calls.fetch_add(1, Ordering::Relaxed);
    }
}

/// Records indices in call order.
#[derive(Debug, Default)]
pub struct OrderLog {
    order: Mutex<Vec<usize>>,
}

impl OrderLog {
    pub fn take(&self) -> Vec<usize> {
        std::mem::take(&mut *self.order.lock().unwrap())
    }
}

impl WorkContract for OrderLog {
    fn process(&self, index: usize) {
        self.order.lock().unwrap().push(index);
    }
}
