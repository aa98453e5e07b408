//! Scheduler configuration.
//!
//! All knobs are fixed at construction. The thread count is resolved once
//! (hardware parallelism snapshot when 0 is requested) and reused by every
//! run of the scheduler.

use std::fmt;
use std::sync::Arc;

use super::error::SchedulerError;
use super::observer::RunObserver;

/// Environment variable overriding [`SchedulerConfig::threads`].
pub const ENV_THREADS: &str = "WORKRANGE_THREADS";
/// Environment variable overriding [`SchedulerConfig::thread_name`].
pub const ENV_THREAD_NAME: &str = "WORKRANGE_THREAD_NAME";

/// Floor used when the platform cannot report its parallelism.
pub const MIN_THREADS: usize = 1;

/// Upper bound on worker-handle capacity reserved before spawning. Larger
/// counts grow the handle vector as threads actually start.
pub(crate) const PRESIZE_WORKERS_MAX: usize = 1024;

/// How workers claim indices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RangeMode {
    /// Limit fixed before `start()`. Claims never block; a drained cursor
    /// ends the worker.
    #[default]
    Static,
    /// Limit grows while workers run. Drained workers block until more work
    /// arrives or the producer closes the range.
    Dynamic,
}

impl RangeMode {
    /// Name used in logs and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            RangeMode::Static => "static",
            RangeMode::Dynamic => "dynamic",
        }
    }
}

impl fmt::Display for RangeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scheduler configuration.
///
/// | Knob          | Default                 |
/// |---------------|-------------------------|
/// | `threads`     | 0 (hardware parallelism) |
/// | `mode`        | `Static`                |
/// | `thread_name` | `"workrange"`           |
/// | `stack_size`  | platform default        |
/// | `observer`    | none                    |
#[derive(Clone)]
pub struct SchedulerConfig {
    /// Worker thread count. 0 resolves to the platform's available parallelism.
    pub threads: usize,

    /// Static or dynamic range.
    pub mode: RangeMode,

    /// Worker threads are named `{thread_name}-{worker_id}`.
    pub thread_name: String,

    /// Stack size for worker threads, in bytes.
    pub stack_size: Option<usize>,

    /// Called once per worker exit with that worker's claim count.
    pub observer: Option<Arc<dyn RunObserver>>,
}

impl fmt::Debug for SchedulerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulerConfig")
            .field("threads", &self.threads)
            .field("mode", &self.mode)
            .field("thread_name", &self.thread_name)
            .field("stack_size", &self.stack_size)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            mode: RangeMode::Static,
            thread_name: "workrange".to_string(),
            stack_size: None,
            observer: None,
        }
    }
}

impl SchedulerConfig {
    /// Defaults with `WORKRANGE_THREADS` / `WORKRANGE_THREAD_NAME` applied.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(raw) = lookup(ENV_THREADS) {
            match raw.trim().parse::<usize>() {
                Ok(n) => cfg.threads = n,
                Err(_) => tracing::warn!(
                    var = ENV_THREADS,
                    value = %raw,
                    "ignoring unparseable thread count"
                ),
            }
        }
        if let Some(name) = lookup(ENV_THREAD_NAME) {
            if !name.is_empty() {
                cfg.thread_name = name;
            }
        }
        cfg
    }

    /// Set the worker count (0 = hardware parallelism).
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the range mode.
    pub fn mode(mut self, mode: RangeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Shorthand for `mode(RangeMode::Dynamic)`.
    pub fn dynamic(self) -> Self {
        self.mode(RangeMode::Dynamic)
    }

    /// Set the worker thread name prefix.
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Set the worker stack size in bytes.
    pub fn stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Install a worker-exit observer.
    pub fn observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Validate configuration.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::InvalidConfig`] for an empty thread name or a zero
    /// stack size.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.thread_name.is_empty() {
            return Err(SchedulerError::InvalidConfig("thread_name must not be empty"));
        }
        if self.stack_size == Some(0) {
            return Err(SchedulerError::InvalidConfig("stack_size must be > 0"));
        }
        Ok(())
    }

    /// Resolve `threads` into a concrete, non-zero count.
    pub fn resolved_threads(&self) -> usize {
        resolve_threads(self.threads)
    }
}

/// Resolve a requested thread count.
///
/// `requested > 0` is returned as-is. `0` becomes the platform's available
/// parallelism, or [`MIN_THREADS`] when the platform cannot report it.
pub fn resolve_threads(requested: usize) -> usize {
    if requested > 0 {
        return requested;
    }
    match std::thread::available_parallelism() {
        Ok(n) => n.get(),
        Err(err) => {
            tracing::warn!(
                error = %err,
                fallback = MIN_THREADS,
                "available_parallelism unavailable; using minimum thread count"
            );
            MIN_THREADS
        }
    }
}
