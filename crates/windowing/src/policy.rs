//! Rotation policy

use tracing::trace;

/// What the writer should do with the current window before persisting an
/// incoming frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDecision {
    /// No window is open; open the first one at this frame's timestamp
    OpenFirst,
    /// The open window has run its course; flush+close it, then open a new
    /// one at this frame's timestamp
    Rotate,
    /// Keep writing into the open window
    Continue,
}

/// Time-based window rotation policy
#[derive(Debug, Clone, Copy)]
pub struct WindowPolicy {
    duration_ms: f64,
}

impl WindowPolicy {
    /// Policy rotating every `duration_ms` milliseconds (must be > 0,
    /// enforced by config validation)
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms: duration_ms as f64,
        }
    }

    /// Configured rotation interval in milliseconds
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// Decide what to do with the current window for a frame captured at
    /// `timestamp_ms`.
    ///
    /// A new window opens iff no window is open, or
    /// `timestamp_ms - open_started_ms >= duration_ms`.
    pub fn decide(&self, open_started_ms: Option<f64>, timestamp_ms: f64) -> RotationDecision {
        let decision = match open_started_ms {
            None => RotationDecision::OpenFirst,
            Some(started) if timestamp_ms - started >= self.duration_ms => {
                RotationDecision::Rotate
            }
            Some(_) => RotationDecision::Continue,
        };
        trace!(?decision, timestamp_ms, "rotation decision");
        decision
    }
}
