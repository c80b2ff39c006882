//! Frame and Capture - the units of work crossing the queue
//!
//! A `Capture` is what the acquisition layer hands over; a `Frame` is a
//! capture after the session stamped it with an id and a resolved timestamp.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Raw result of one hardware trigger, as delivered by the acquisition layer.
///
/// The device may or may not expose a frame counter and a hardware clock;
/// both are optional here and resolved by the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capture {
    /// Device-side frame counter, when the driver exposes one.
    /// Used only for gap diagnostics, never as the session frame id.
    pub sequence_hint: Option<u64>,

    /// Hardware capture timestamp in microseconds on the device clock.
    pub hardware_timestamp_us: Option<u64>,

    /// Image data for this trigger.
    pub payload: ImagePayload,
}

impl Capture {
    /// Hardware timestamp converted to milliseconds, if the device provided one.
    pub fn hardware_timestamp_ms(&self) -> Option<f64> {
        self.hardware_timestamp_us.map(|us| us as f64 / 1000.0)
    }
}

/// A unit of work flowing through the queue to the sink.
///
/// Immutable once created; exclusively owned by whichever stage currently
/// holds it (producer, queue, consumer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    /// Session-assigned id, strictly increasing from 1, never reused.
    pub id: u64,

    /// Capture timestamp in milliseconds.
    pub timestamp_ms: f64,

    /// Which clock produced `timestamp_ms`.
    pub clock: TimestampClock,

    /// Image data (zero-copy handle).
    pub payload: ImagePayload,
}

/// Origin of a frame's timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampClock {
    /// The camera's own clock (preferred).
    Hardware,
    /// Host wall clock substituted because the device clock was unavailable.
    Host,
}

/// Image buffer plus the minimum metadata needed to encode it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagePayload {
    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Pixel layout of `data`
    pub format: PixelFormat,

    /// Raw pixel data (zero-copy)
    pub data: Bytes,
}

impl ImagePayload {
    /// Byte length `data` must have for the declared dimensions and format.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }

    /// Build a single-color payload. Used by the synthetic source and tests.
    pub fn solid(width: u32, height: u32, format: PixelFormat, fill: u8) -> Self {
        let size = width as usize * height as usize * format.bytes_per_pixel();
        Self {
            width,
            height,
            format,
            data: Bytes::from(vec![fill; size]),
        }
    }
}

/// Pixel layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// 8-bit grayscale (the common Basler default)
    Mono8,
    Rgb8,
    Bgra8,
}

impl PixelFormat {
    /// Bytes per pixel for this layout.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Mono8 => 1,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Bgra8 => 4,
        }
    }
}
