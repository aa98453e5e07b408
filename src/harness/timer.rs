//! Wall clock plus process CPU time around one strategy run.

use std::fmt;
use std::time::{Duration, Instant};

use super::rusage::{cpu_usage_self, CpuUsage};

/// Wall and CPU time of one measured section.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timing {
    pub wall: Duration,
    pub cpu: Duration,
}

impl Timing {
    /// `other.wall / self.wall`: how many times faster `self` ran.
    pub fn speedup_over(&self, other: &Timing) -> f64 {
        let wall = self.wall.as_secs_f64();
        if wall == 0.0 {
            0.0
        } else {
            other.wall.as_secs_f64() / wall
        }
    }
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "wall={:.3}s cpu={:.3}s",
            self.wall.as_secs_f64(),
            self.cpu.as_secs_f64()
        )
    }
}

/// Running measurement started by [`Stopwatch::start`].
#[derive(Debug)]
pub struct Stopwatch {
    wall0: Instant,
    cpu0: CpuUsage,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            cpu0: cpu_usage_self(),
            wall0: Instant::now(),
        }
    }

    pub fn stop(self) -> Timing {
        let wall = self.wall0.elapsed();
        let cpu = cpu_usage_self().since(&self.cpu0).total();
        Timing { wall, cpu }
    }
}

/// Time `f` and return its output with the timing.
pub fn timed<T>(f: impl FnOnce() -> T) -> (T, Timing) {
    let sw = Stopwatch::start();
    let out = f();
    (out, sw.stop())
}
