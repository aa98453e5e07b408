//! Measurement harness.
//!
//! Sleep workloads, baselines and timers for comparing the scheduler against
//! a single thread and against static partitioning. Everything here is an
//! ordinary caller of the public scheduler API.

pub mod rng;
pub mod rusage;
pub mod strategy;
pub mod timer;
pub mod workload;

pub use rng::XorShift64;
pub use rusage::{cpu_usage_self, CpuUsage};
pub use strategy::{partition, run_generated, run_partitioned, run_sequential};
pub use timer::{timed, Stopwatch, Timing};
pub use workload::{SleepTable, UniformSleep, DEFAULT_SEED, MAX_ITEM_MS};
