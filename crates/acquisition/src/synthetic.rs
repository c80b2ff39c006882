//! Synthetic trigger source
//!
//! Generates captures at a configured mean rate, as if an external pulse
//! generator were wired to the trigger line. Used for development and demos
//! without hardware.

use std::time::Duration;

use contracts::{Capture, CaptureError, CaptureSource, ImageConfig, ImagePayload, SourceConfig, SourcePoll};
use rand::Rng;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace};

/// Fake triggered camera pacing captures at a configured rate.
///
/// The simulated device clock is the elapsed time since construction, in
/// microseconds, reported as the hardware timestamp unless `hardware_clock`
/// is disabled (which exercises the host-clock fallback downstream).
pub struct SyntheticTriggerSource {
    name: String,
    interval: Duration,
    jitter_ms: f64,
    image: ImageConfig,
    hardware_clock: bool,
    epoch: Instant,
    next_fire: Instant,
    sequence: u64,
}

impl SyntheticTriggerSource {
    /// Create a source firing at `frequency_hz` (must be > 0, enforced by
    /// config validation)
    pub fn new(name: impl Into<String>, frequency_hz: f64, image: ImageConfig) -> Self {
        let interval = Duration::from_secs_f64(1.0 / frequency_hz);
        let epoch = Instant::now();
        Self {
            name: name.into(),
            interval,
            jitter_ms: 0.0,
            image,
            hardware_clock: true,
            epoch,
            next_fire: epoch + interval,
            sequence: 0,
        }
    }

    /// Build from the blueprint's source section
    pub fn from_config(name: impl Into<String>, config: &SourceConfig) -> Self {
        let mut source = Self::new(name, config.frequency_hz, config.image);
        source.jitter_ms = config.jitter_ms;
        source.hardware_clock = config.hardware_clock;
        source
    }

    /// Apply uniform jitter of up to `jitter_ms` to each trigger interval
    pub fn with_jitter_ms(mut self, jitter_ms: f64) -> Self {
        self.jitter_ms = jitter_ms;
        self
    }

    /// Simulate a device without a usable hardware clock
    pub fn without_hardware_clock(mut self) -> Self {
        self.hardware_clock = false;
        self
    }

    fn next_interval(&self) -> Duration {
        if self.jitter_ms > 0.0 {
            let jitter = rand::rng().random_range(-self.jitter_ms..=self.jitter_ms);
            let ms = (self.interval.as_secs_f64() * 1000.0 + jitter).max(0.1);
            Duration::from_secs_f64(ms / 1000.0)
        } else {
            self.interval
        }
    }

    fn generate_capture(&self, fired_at: Instant) -> Capture {
        // Vary the fill so consecutive frames are distinguishable on disk
        let fill = (self.sequence % 251) as u8;
        let payload =
            ImagePayload::solid(self.image.width, self.image.height, self.image.format, fill);

        let hardware_timestamp_us = self
            .hardware_clock
            .then(|| (fired_at - self.epoch).as_micros() as u64);

        Capture {
            sequence_hint: Some(self.sequence),
            hardware_timestamp_us,
            payload,
        }
    }
}

impl CaptureSource for SyntheticTriggerSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn poll(&mut self, timeout: Duration) -> Result<SourcePoll, CaptureError> {
        let deadline = Instant::now() + timeout;

        if self.next_fire > deadline {
            // No trigger inside this poll; emulate the driver timeout
            sleep_until(deadline).await;
            trace!(source = %self.name, "poll timed out");
            return Ok(SourcePoll::TimedOut);
        }

        sleep_until(self.next_fire).await;
        let fired_at = self.next_fire;
        self.sequence += 1;
        let capture = self.generate_capture(fired_at);
        self.next_fire = fired_at + self.next_interval();

        debug!(
            source = %self.name,
            sequence = self.sequence,
            "synthetic trigger fired"
        );
        Ok(SourcePoll::Captured(capture))
    }
}
