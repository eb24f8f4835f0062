// Copyright (c) The testdox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Elapsed time and memory usage, reported once at the end of a run.

use bytesize::ByteSize;
use chrono::{DateTime, Local};
use std::time::{Duration, Instant};

/// Describes the resources used by the run so far.
pub trait ResourceUsage {
    /// Returns a one-line description of the elapsed wall time and, where
    /// available, memory usage.
    fn describe(&self) -> String;
}

/// Measures the current process.
///
/// Wall time is measured from construction using a monotonic clock. Memory
/// usage is the peak resident set size, which is only available on Unix.
#[derive(Clone, Debug)]
pub struct ProcessResourceUsage {
    start_time: DateTime<Local>,
    instant: Instant,
}

impl ProcessResourceUsage {
    /// Starts measuring now.
    pub fn start() -> Self {
        Self {
            // These two calls happen imperceptibly close to each other, which
            // is good enough here.
            start_time: Local::now(),
            instant: Instant::now(),
        }
    }

    /// The wall-clock time at which measurement started.
    pub fn start_time(&self) -> DateTime<Local> {
        self.start_time
    }

    /// The time elapsed since measurement started.
    pub fn elapsed(&self) -> Duration {
        self.instant.elapsed()
    }
}

impl ResourceUsage for ProcessResourceUsage {
    fn describe(&self) -> String {
        format_usage(self.elapsed(), peak_memory())
    }
}

/// A fixed description, for deterministic output.
#[derive(Clone, Debug)]
pub struct FixedResourceUsage(pub String);

impl ResourceUsage for FixedResourceUsage {
    fn describe(&self) -> String {
        self.0.clone()
    }
}

fn format_usage(elapsed: Duration, peak_memory: Option<u64>) -> String {
    match peak_memory {
        Some(bytes) => format!(
            "Time: {:.3}s, Memory: {}",
            elapsed.as_secs_f64(),
            ByteSize::b(bytes)
        ),
        None => format!("Time: {:.3}s", elapsed.as_secs_f64()),
    }
}

/// Returns the peak resident set size of this process in bytes.
#[cfg(unix)]
fn peak_memory() -> Option<u64> {
    let mut usage = std::mem::MaybeUninit::<libc::rusage>::zeroed();
    // SAFETY: getrusage fills in the struct it is passed on success, and the
    // struct was zero-initialized beforehand.
    let ret = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
    if ret != 0 {
        return None;
    }
    // SAFETY: zero-initialized and then written by getrusage.
    let usage = unsafe { usage.assume_init() };
    let max_rss = u64::try_from(usage.ru_maxrss).ok()?;

    // macOS reports bytes, everything else reports kilobytes.
    if cfg!(target_vendor = "apple") {
        Some(max_rss)
    } else {
        Some(max_rss.saturating_mul(1024))
    }
}

#[cfg(not(unix))]
fn peak_memory() -> Option<u64> {
    None
}
