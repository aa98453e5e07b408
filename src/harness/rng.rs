//! Tiny deterministic RNG for reproducible workload tables.
//!
//! XorShift64 with Lemire bounded sampling. Same seed, same sleep table, so
//! every strategy in a comparison run sees identical per-item costs.

/// Deterministic XorShift64 generator.
///
/// Intentionally not `Copy`: copying duplicates the stream.
#[derive(Clone, Debug)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    /// Create a generator. Seed 0 is remapped to avoid the all-zero lockup.
    #[inline]
    pub fn new(seed: u64) -> Self {
        let seed = if seed == 0 { 0x9E3779B97F4A7C15 } else { seed };
        Self { state: seed }
    }

    /// Next raw value. Shift triple (13, 7, 17) is full-period.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform value in `[0, upper)`.
    ///
    /// # Panics
    /// Panics if `upper` is 0.
    #[inline]
    pub fn next_below(&mut self, upper: u64) -> u64 {
        assert!(upper > 0, "upper bound must be > 0");
        // Lemire: reject the 2^64 mod upper "bad zone", then multiply-high.
        let threshold = upper.wrapping_neg() % upper;
        loop {
            let m = (self.next_u64() as u128) * (upper as u128);
            if (m as u64) >= threshold {
                return (m >> 64) as u64;
            }
        }
    }
}
