//! Range Scheduler: shared-cursor work distribution
//!
//! # Architecture
//!
//! One engine, two claim modes:
//! - **Static range**: limit fixed before `start()`; workers drain and exit
//! - **Dynamic range**: a producer grows the limit while workers drain it,
//!   then closes the range
//!
//! # Layout
//!
//! | Module      | Role                                              |
//! |-------------|---------------------------------------------------|
//! | `cursor`    | Mutex + condvar claim protocol                    |
//! | `pool`      | Thread lifecycle (`start` / `join` / re-run)      |
//! | `producer`  | Cloneable handle that extends and closes a range  |
//! | `scoped`    | Borrowing static run over `std::thread::scope`    |
//! | `contract`  | The `process(index)` capability                   |
//! | `config`    | Thread count, mode, naming, observer              |
//! | `metrics`   | Per-worker claim counts returned from `join`      |
//! | `observer`  | Worker-exit reporting hooks                       |
//! | `worker_id` | Thread-local id of the running worker             |

pub mod config;
pub mod contract;
pub mod cursor;
pub mod error;
pub mod metrics;
pub mod observer;
pub mod pool;
pub mod producer;
pub mod scoped;
pub mod worker_id;

// Re-exports for primary types
pub use config::{
    resolve_threads, RangeMode, SchedulerConfig, ENV_THREADS, ENV_THREAD_NAME, MIN_THREADS,
};
pub use contract::WorkContract;
pub use cursor::{ClaimCursor, RangeSnapshot};
pub use error::SchedulerError;
pub use metrics::{RunReport, WorkerReport};
pub use observer::{LinePrinter, RunObserver, TracingObserver};
pub use pool::Scheduler;
pub use producer::RangeProducer;
pub use scoped::for_each_index;
pub use worker_id::current_worker_id;
