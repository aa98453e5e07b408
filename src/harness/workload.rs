//! Sleep-based work contracts.
//!
//! Sleeping stands in for real per-item work (a DCT block, a file chunk):
//! it costs wall time but almost no CPU, so the wall/CPU split shows how well
//! the schedule overlaps items.

use std::thread;
use std::time::Duration;

use super::rng::XorShift64;
use crate::scheduler::WorkContract;

/// Seed used by the demo so repeated runs compare identical tables.
pub const DEFAULT_SEED: u64 = 0;

/// Exclusive upper bound on a non-uniform item's sleep, in milliseconds.
pub const MAX_ITEM_MS: u64 = 100;

/// Every item sleeps the same fixed time.
#[derive(Clone, Copy, Debug)]
pub struct UniformSleep {
    per_item: Duration,
}

impl UniformSleep {
    pub fn new(per_item: Duration) -> Self {
        Self { per_item }
    }

    pub fn per_item(&self) -> Duration {
        self.per_item
    }
}

impl WorkContract for UniformSleep {
    fn process(&self, _index: usize) {
        thread::sleep(self.per_item);
    }
}

/// Per-item sleep looked up in a seeded table of values in `[0, 100)` ms.
///
/// Indices past the end of the table wrap around.
#[derive(Clone, Debug)]
pub struct SleepTable {
    millis: Vec<u64>,
}

impl SleepTable {
    /// `items` entries drawn from `XorShift64::new(seed)`.
    pub fn seeded(items: usize, seed: u64) -> Self {
        let mut rng = XorShift64::new(seed);
        Self {
            millis: (0..items).map(|_| rng.next_below(MAX_ITEM_MS)).collect(),
        }
    }

    /// Table from explicit per-item millisecond costs.
    pub fn from_millis(millis: Vec<u64>) -> Self {
        Self { millis }
    }

    pub fn len(&self) -> usize {
        self.millis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.millis.is_empty()
    }

    /// Sleep for item `index`.
    pub fn cost(&self, index: usize) -> Duration {
        if self.millis.is_empty() {
            return Duration::ZERO;
        }
        Duration::from_millis(self.millis[index % self.millis.len()])
    }

    /// Sum of every entry: the single-thread lower bound.
    pub fn total(&self) -> Duration {
        Duration::from_millis(self.millis.iter().sum())
    }

    /// Largest entry: the any-thread-count lower bound.
    pub fn longest(&self) -> Duration {
        Duration::from_millis(self.millis.iter().copied().max().unwrap_or(0))
    }
}

impl WorkContract for SleepTable {
    fn process(&self, index: usize) {
        thread::sleep(self.cost(index));
    }
}
