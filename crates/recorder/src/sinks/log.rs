//! LogSink - logs frames via tracing, nothing touches disk
//!
//! Used for dry runs. Window state is tracked so rotation is exercised
//! exactly as it would be against the durable sink.

use std::path::Path;

use contracts::{CaptureError, Frame, RecordSink};
use tracing::{info, instrument};

/// Sink that logs frame summaries instead of persisting them
pub struct LogSink {
    name: String,
    window_started_ms: Option<f64>,
    windows_closed: u64,
    frames_in_window: u64,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            window_started_ms: None,
            windows_closed: 0,
            frames_in_window: 0,
        }
    }
}

impl RecordSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn window_started_at(&self) -> Option<f64> {
        self.window_started_ms
    }

    fn windows_closed(&self) -> u64 {
        self.windows_closed
    }

    fn last_window(&self) -> Option<&Path> {
        None
    }

    #[instrument(name = "log_sink_open_window", skip(self), fields(sink = %self.name))]
    async fn open_window(&mut self, start_ms: f64) -> Result<(), CaptureError> {
        if self.window_started_ms.take().is_some() {
            self.windows_closed += 1;
            info!(
                sink = %self.name,
                frames = self.frames_in_window,
                "window closed"
            );
        }
        self.window_started_ms = Some(start_ms);
        self.frames_in_window = 0;
        info!(sink = %self.name, start_ms, "window opened");
        Ok(())
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, frame),
        fields(sink = %self.name, frame_id = frame.id)
    )]
    async fn write(&mut self, frame: &Frame) -> Result<(), CaptureError> {
        self.frames_in_window += 1;
        info!(
            sink = %self.name,
            frame_id = frame.id,
            timestamp_ms = frame.timestamp_ms,
            clock = ?frame.clock,
            width = frame.payload.width,
            height = frame.payload.height,
            "frame received"
        );
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), CaptureError> {
        // Nothing buffered
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), CaptureError> {
        if self.window_started_ms.take().is_some() {
            self.windows_closed += 1;
            info!(
                sink = %self.name,
                frames = self.frames_in_window,
                "window closed"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use contracts::{ImagePayload, PixelFormat, TimestampClock};

    fn frame(id: u64) -> Frame {
        Frame {
            id,
            timestamp_ms: 0.0,
            clock: TimestampClock::Host,
            payload: ImagePayload {
                width: 1,
                height: 1,
                format: PixelFormat::Mono8,
                data: Bytes::from_static(&[0]),
            },
        }
    }

    #[tokio::test]
    async fn tracks_window_state() {
        let mut sink = LogSink::new("dry_run");
        assert!(sink.window_started_at().is_none());

        sink.open_window(5.0).await.unwrap();
        assert_eq!(sink.window_started_at(), Some(5.0));
        sink.write(&frame(1)).await.unwrap();

        sink.open_window(20.0).await.unwrap();
        assert_eq!(sink.windows_closed(), 1);

        sink.close().await.unwrap();
        sink.close().await.unwrap();
        assert_eq!(sink.windows_closed(), 2);
    }
}
