//! Writer-side counters for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters for a running writer task
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Total successful frame writes
    write_count: AtomicU64,
    /// Total write failures
    failure_count: AtomicU64,
    /// Total windows opened (first open included)
    windows_rotated: AtomicU64,
}

impl SinkMetrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total write count
    pub fn write_count(&self) -> u64 {
        self.write_count.load(Ordering::Relaxed)
    }

    /// Increment write count
    pub fn inc_write_count(&self) {
        self.write_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get failure count
    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// Increment failure count
    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get windows-rotated count
    pub fn windows_rotated(&self) -> u64 {
        self.windows_rotated.load(Ordering::Relaxed)
    }

    /// Increment windows-rotated count
    pub fn inc_windows_rotated(&self) {
        self.windows_rotated.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all counters
    pub fn snapshot(&self) -> SinkMetricsSnapshot {
        SinkMetricsSnapshot {
            write_count: self.write_count(),
            failure_count: self.failure_count(),
            windows_rotated: self.windows_rotated(),
        }
    }
}

/// Snapshot of writer counters (for reporting)
#[derive(Debug, Clone, Copy)]
pub struct SinkMetricsSnapshot {
    pub write_count: u64,
    pub failure_count: u64,
    pub windows_rotated: u64,
}
