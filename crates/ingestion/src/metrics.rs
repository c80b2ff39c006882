//! Queue-side counters

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Ingestion metrics
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Total frames accepted into the queue
    pub frames_accepted: AtomicU64,

    /// Total frames dropped by the overflow policy
    pub frames_dropped: AtomicU64,

    /// Current queue depth
    pub queue_len: AtomicUsize,
}

impl IngestionMetrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame accepted into the queue
    pub fn record_accepted(&self) {
        self.frames_accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a frame dropped by the overflow policy
    pub fn record_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Update the current queue depth
    pub fn update_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    /// Get a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_accepted: self.frames_accepted.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            queue_len: self.queue_len.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    /// Total frames accepted into the queue
    pub frames_accepted: u64,

    /// Total frames dropped by the overflow policy
    pub frames_dropped: u64,

    /// Current queue depth
    pub queue_len: usize,
}
