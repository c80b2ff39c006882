//! Capture pipeline metrics
//!
//! Prometheus-facing recording functions plus in-memory aggregation of
//! trigger timing for the end-of-session summary.

use metrics::{counter, histogram};

/// Record a frame accepted into the queue
pub fn record_frame_accepted(hardware_clock: bool) {
    counter!("burstcap_frames_accepted_total").increment(1);
    if !hardware_clock {
        counter!("burstcap_host_clock_frames_total").increment(1);
    }
}

/// Record a frame discarded by the overflow policy
pub fn record_frame_dropped() {
    counter!("burstcap_frames_dropped_total").increment(1);
}

/// Record a frame durably persisted by the sink
pub fn record_frame_persisted(write_ms: f64) {
    counter!("burstcap_frames_persisted_total").increment(1);
    histogram!("burstcap_write_ms").record(write_ms);
}

/// Record a window rotation
pub fn record_window_rotated() {
    counter!("burstcap_windows_rotated_total").increment(1);
}

/// Trigger timing aggregator
///
/// Collects inter-trigger gaps in memory so the session can summarize the
/// external trigger's behavior (its rate is not under our control and worth
/// reporting).
#[derive(Debug, Clone, Default)]
pub struct TriggerStatsAggregator {
    last_timestamp_ms: Option<f64>,
    gaps: RunningStats,
}

impl TriggerStatsAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one accepted frame's capture timestamp (ms)
    pub fn record_trigger(&mut self, timestamp_ms: f64) {
        if let Some(prev) = self.last_timestamp_ms {
            let gap = timestamp_ms - prev;
            // Ignore non-monotonic pairs (e.g. clock source switched)
            if gap >= 0.0 {
                self.gaps.push(gap);
                histogram!("burstcap_trigger_gap_ms").record(gap);
            }
        }
        self.last_timestamp_ms = Some(timestamp_ms);
    }

    /// Produce the summary report
    pub fn summary(&self) -> TriggerStatsSummary {
        let gap_ms = StatsSummary::from(&self.gaps);
        let rate_hz = if gap_ms.count > 0 && gap_ms.mean > 0.0 {
            1000.0 / gap_ms.mean
        } else {
            0.0
        };
        TriggerStatsSummary { gap_ms, rate_hz }
    }
}

/// Trigger timing summary
#[derive(Debug, Clone, Default)]
pub struct TriggerStatsSummary {
    /// Inter-trigger gap statistics in milliseconds
    pub gap_ms: StatsSummary,
    /// Mean trigger rate estimated from the gaps
    pub rate_hz: f64,
}

impl std::fmt::Display for TriggerStatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.gap_ms.count == 0 {
            write!(f, "N/A")
        } else {
            write!(f, "{} (~{:.2} Hz)", self.gap_ms, self.rate_hz)
        }
    }
}

/// Summary of a statistic series
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a new value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum
    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        stats.push(1.0);
        stats.push(2.0);
        stats.push(3.0);
        stats.push(4.0);
        stats.push(5.0);

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_trigger_aggregator_gaps() {
        let mut aggregator = TriggerStatsAggregator::new();
        aggregator.record_trigger(0.0);
        aggregator.record_trigger(20.0);
        aggregator.record_trigger(40.0);
        aggregator.record_trigger(60.0);

        let summary = aggregator.summary();
        assert_eq!(summary.gap_ms.count, 3);
        assert!((summary.gap_ms.mean - 20.0).abs() < 1e-10);
        assert!((summary.rate_hz - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_trigger_aggregator_ignores_backwards_jump() {
        let mut aggregator = TriggerStatsAggregator::new();
        aggregator.record_trigger(100.0);
        aggregator.record_trigger(50.0); // clock source switched
        aggregator.record_trigger(70.0);

        let summary = aggregator.summary();
        assert_eq!(summary.gap_ms.count, 1);
        assert!((summary.gap_ms.mean - 20.0).abs() < 1e-10);
    }

    #[test]
    fn test_summary_display() {
        let summary = TriggerStatsSummary::default();
        assert_eq!(format!("{}", summary), "N/A");
    }
}
