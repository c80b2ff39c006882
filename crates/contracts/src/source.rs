//! CaptureSource trait - acquisition boundary
//!
//! Pull-style interface over the device/driver layer that arms a hardware
//! trigger and yields raw image buffers. The caller polls with a timeout;
//! a timeout means "no trigger yet" and must be retried indefinitely
//! without being treated as an error.

use std::time::Duration;

use crate::{Capture, CaptureError};

/// Outcome of one poll against an acquisition source.
#[derive(Debug, Clone)]
pub enum SourcePoll {
    /// A trigger fired and a frame was captured.
    Captured(Capture),
    /// No trigger arrived within the poll timeout. Normal, retry.
    TimedOut,
    /// The source has no further frames to deliver (finite sources only,
    /// e.g. replay reached end of the recording).
    Exhausted,
}

/// Acquisition source trait
///
/// Implemented by anything that can stand in for the triggered camera:
/// the synthetic generator, the scripted test source, the session replayer.
///
/// # Contract
/// - `poll` waits at most `timeout` for the next capture
/// - `SourcePoll::TimedOut` is a normal outcome, not an error; callers must
///   tolerate any number of consecutive timeouts
/// - Errors are reserved for unrecoverable source failures
#[trait_variant::make(CaptureSource: Send)]
pub trait LocalCaptureSource {
    /// Source name (used for logging/errors)
    fn name(&self) -> &str;

    /// Wait up to `timeout` for the next hardware-triggered capture.
    async fn poll(&mut self, timeout: Duration) -> Result<SourcePoll, CaptureError>;
}
