//! Scripted source for deterministic tests
//!
//! Plays back a fixed list of events: captures, driver timeouts, then
//! end-of-script. No timers involved; each poll consumes one event.

use std::collections::VecDeque;
use std::time::Duration;

use contracts::{
    Capture, CaptureError, CaptureSource, ImagePayload, PixelFormat, SourcePoll,
};

/// One scripted poll outcome
#[derive(Debug, Clone)]
pub enum ScriptedEvent {
    /// Deliver this capture
    Capture(Capture),
    /// Report a driver timeout ("no trigger yet")
    TimeOut,
}

/// Capture source that replays a fixed event list
pub struct ScriptedSource {
    name: String,
    events: VecDeque<ScriptedEvent>,
}

impl ScriptedSource {
    /// Create from an explicit event list
    pub fn new(name: impl Into<String>, events: impl IntoIterator<Item = ScriptedEvent>) -> Self {
        Self {
            name: name.into(),
            events: events.into_iter().collect(),
        }
    }

    /// One capture per timestamp (milliseconds on the simulated hardware
    /// clock), tiny grayscale payloads whose fill byte is the capture index.
    pub fn from_timestamps(name: impl Into<String>, timestamps_ms: &[f64]) -> Self {
        let events = timestamps_ms
            .iter()
            .enumerate()
            .map(|(i, &ts_ms)| {
                ScriptedEvent::Capture(Capture {
                    sequence_hint: Some(i as u64 + 1),
                    hardware_timestamp_us: Some((ts_ms * 1000.0) as u64),
                    payload: ImagePayload::solid(2, 2, PixelFormat::Mono8, i as u8),
                })
            })
            .collect();
        Self {
            name: name.into(),
            events,
        }
    }

    /// Strip the hardware timestamps from every scripted capture, forcing the
    /// host-clock fallback downstream.
    pub fn without_hardware_clock(mut self) -> Self {
        for event in &mut self.events {
            if let ScriptedEvent::Capture(capture) = event {
                capture.hardware_timestamp_us = None;
            }
        }
        self
    }

    /// Events not yet consumed
    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl CaptureSource for ScriptedSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn poll(&mut self, _timeout: Duration) -> Result<SourcePoll, CaptureError> {
        match self.events.pop_front() {
            Some(ScriptedEvent::Capture(capture)) => Ok(SourcePoll::Captured(capture)),
            Some(ScriptedEvent::TimeOut) => Ok(SourcePoll::TimedOut),
            None => Ok(SourcePoll::Exhausted),
        }
    }
}
