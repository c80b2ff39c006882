//! Session statistics and summary output

use std::path::PathBuf;
use std::time::Duration;

use contracts::CaptureError;
use observability::TriggerStatsSummary;

/// Final accounting of a capture session
#[derive(Debug)]
pub struct SessionReport {
    /// Frames accepted from the acquisition source and enqueued
    pub frames_accepted: u64,

    /// Frames durably persisted (image + index row)
    pub frames_persisted: u64,

    /// Frames discarded by the overflow policy
    pub frames_dropped: u64,

    /// Frames whose timestamp fell back to the host clock
    pub host_clock_frames: u64,

    /// Output windows flushed and closed
    pub windows_closed: u64,

    /// Path of the last successfully closed window, if any
    pub last_window: Option<PathBuf>,

    /// Session output directory
    pub session_root: PathBuf,

    /// Wall-clock duration of the session
    pub duration: Duration,

    /// External trigger timing statistics
    pub trigger_stats: TriggerStatsSummary,

    /// The fatal error that ended the session early, if any
    pub failure: Option<CaptureError>,
}

impl SessionReport {
    /// Whether the session ran to completion without a fatal error
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Persisted frames per second over the session
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.frames_persisted as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Dropped frames as a percentage of frames offered
    pub fn drop_rate(&self) -> f64 {
        let total = self.frames_accepted + self.frames_dropped;
        if total > 0 {
            (self.frames_dropped as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print a detailed summary to stdout
    pub fn print_summary(&self) {
        println!("\n==================== Capture Session ====================\n");

        println!("Overview");
        println!("   |- Output: {}", self.session_root.display());
        println!("   |- Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   |- Frames accepted: {}", self.frames_accepted);
        println!("   |- Frames persisted: {}", self.frames_persisted);
        println!(
            "   |- Frames dropped: {} ({:.2}%)",
            self.frames_dropped,
            self.drop_rate()
        );
        println!("   |- Host-clock fallbacks: {}", self.host_clock_frames);
        println!("   |- Throughput: {:.2} fps", self.fps());
        println!("   |- Windows closed: {}", self.windows_closed);
        match &self.last_window {
            Some(path) => println!("   `- Last window: {}", path.display()),
            None => println!("   `- Last window: none"),
        }

        println!("\nTrigger timing");
        println!("   `- Gap: {}", self.trigger_stats);

        if let Some(failure) = &self.failure {
            println!("\nFAILED: {failure}");
        }

        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> SessionReport {
        SessionReport {
            frames_accepted: 8,
            frames_persisted: 8,
            frames_dropped: 2,
            host_clock_frames: 0,
            windows_closed: 1,
            last_window: None,
            session_root: PathBuf::from("output/20250101_120000"),
            duration: Duration::from_secs(4),
            trigger_stats: TriggerStatsSummary::default(),
            failure: None,
        }
    }

    #[test]
    fn rates_computed_from_counts() {
        let report = report();
        assert!(report.is_success());
        assert!((report.fps() - 2.0).abs() < 1e-10);
        assert!((report.drop_rate() - 20.0).abs() < 1e-10);
    }

    #[test]
    fn failure_marks_report_unsuccessful() {
        let mut report = report();
        report.failure = Some(CaptureError::sink_write("burst", "disk full"));
        assert!(!report.is_success());
    }
}
