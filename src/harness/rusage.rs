//! Process CPU time via `getrusage`.
//!
//! # Important Semantics
//!
//! **CPU time vs wall time**: with N busy workers, `user + sys` grows about N
//! times faster than the wall clock. Sleep-based workloads consume almost no
//! CPU at all, which is the point of comparing the two numbers.
//!
//! **Syscall cost**: `getrusage()` is a syscall. Sample at run boundaries,
//! never per item.
//!
//! Non-Unix targets report zero.

use std::time::Duration;

/// CPU time consumed by this process so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuUsage {
    /// Time spent executing in user mode.
    pub user_time: Duration,
    /// Time spent executing in kernel mode.
    pub sys_time: Duration,
}

impl CpuUsage {
    /// User plus system time.
    #[inline]
    pub fn total(&self) -> Duration {
        self.user_time.saturating_add(self.sys_time)
    }

    /// Time consumed since an earlier sample.
    #[inline]
    pub fn since(&self, earlier: &CpuUsage) -> CpuUsage {
        CpuUsage {
            user_time: self.user_time.saturating_sub(earlier.user_time),
            sys_time: self.sys_time.saturating_sub(earlier.sys_time),
        }
    }
}

#[cfg(unix)]
#[inline]
fn timeval_to_duration(tv: libc::timeval) -> Duration {
    let secs = if tv.tv_sec < 0 { 0 } else { tv.tv_sec as u64 };
    // POSIX says tv_usec is in [0, 999_999].
    let usec = tv.tv_usec.clamp(0, 999_999) as u64;
    Duration::from_secs(secs) + Duration::from_micros(usec)
}

/// CPU usage of the whole process (all threads).
///
/// Returns zero if the syscall fails.
#[cfg(unix)]
pub fn cpu_usage_self() -> CpuUsage {
    // SAFETY: an all-zero `rusage` is a valid value, and the pointer is to a
    // live local for the duration of the call.
    let (rc, ru) = unsafe {
        let mut ru: libc::rusage = std::mem::zeroed();
        let rc = libc::getrusage(libc::RUSAGE_SELF, &mut ru);
        (rc, ru)
    };
    if rc != 0 {
        tracing::trace!(rc, "getrusage failed");
        return CpuUsage::default();
    }
    CpuUsage {
        user_time: timeval_to_duration(ru.ru_utime),
        sys_time: timeval_to_duration(ru.ru_stime),
    }
}

#[cfg(not(unix))]
pub fn cpu_usage_self() -> CpuUsage {
    CpuUsage::default()
}
