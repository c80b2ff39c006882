//! RecordSink trait - writer output interface
//!
//! Defines the abstract interface for per-window durable sinks.

use std::path::Path;

use crate::{CaptureError, Frame};

/// Durable frame sink
///
/// All sink implementations must implement this trait. A sink owns at most
/// one open window at a time; the writer task decides when to rotate and
/// calls `open_window` before writing into the new range.
#[trait_variant::make(RecordSink: Send)]
pub trait LocalRecordSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Start timestamp (ms) of the currently open window, if any
    fn window_started_at(&self) -> Option<f64>;

    /// Number of windows flushed and closed so far
    fn windows_closed(&self) -> u64;

    /// Path of the last successfully closed window, if any
    fn last_window(&self) -> Option<&Path>;

    /// Open a new window starting at `start_ms`, flushing and closing any
    /// window that is already open (strictly before creating the new one)
    ///
    /// # Errors
    /// Returns a sink error if closing the old window or creating the new
    /// one fails
    async fn open_window(&mut self, start_ms: f64) -> Result<(), CaptureError>;

    /// Persist one frame into the currently open window
    ///
    /// # Errors
    /// Returns a sink error (should include context); fatal for the window
    async fn write(&mut self, frame: &Frame) -> Result<(), CaptureError>;

    /// Flush buffered index data (if any)
    async fn flush(&mut self) -> Result<(), CaptureError>;

    /// Close the current window. Idempotent: closing with no open window is
    /// a no-op, not an error
    async fn close(&mut self) -> Result<(), CaptureError>;
}
