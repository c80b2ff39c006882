//! Writer task - the single consumer of the frame queue
//!
//! Dequeues frames in order, applies the rotation decision, and calls the
//! sink. A sink failure is fatal: the queue is closed so the producer halts,
//! the current window is closed cleanly, and the failure is carried in the
//! returned `WriterOutcome` together with the counts persisted so far.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use contracts::{CaptureError, RecordSink};
use ingestion::FrameQueue;
use observability::{record_frame_persisted, record_window_rotated};
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument};
use windowing::{RotationDecision, WindowPolicy};

use crate::metrics::SinkMetrics;

/// Final accounting of a writer task
#[derive(Debug)]
pub struct WriterOutcome {
    /// Frames durably written (image + index row)
    pub frames_persisted: u64,

    /// Windows flushed and closed
    pub windows_closed: u64,

    /// Path of the last successfully closed window, if any
    pub last_window: Option<PathBuf>,

    /// The fatal sink error, if the writer stopped early
    pub failure: Option<CaptureError>,
}

/// Handle to a running writer task
pub struct WriterHandle {
    metrics: Arc<SinkMetrics>,
    task: JoinHandle<WriterOutcome>,
}

impl WriterHandle {
    /// Live counters for the running writer
    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Wait for the writer to finish draining and return its outcome
    pub async fn join(self) -> WriterOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = ?e, "writer task panicked");
                WriterOutcome {
                    frames_persisted: self.metrics.write_count(),
                    windows_closed: 0,
                    last_window: None,
                    failure: Some(CaptureError::Other(format!("writer task panicked: {e}"))),
                }
            }
        }
    }
}

/// Spawn the writer task consuming `queue` into `sink`
pub fn spawn_writer<S>(queue: FrameQueue, policy: WindowPolicy, sink: S) -> WriterHandle
where
    S: RecordSink + 'static,
{
    let metrics = Arc::new(SinkMetrics::new());
    let task_metrics = Arc::clone(&metrics);
    let task = tokio::spawn(async move { writer_loop(queue, policy, sink, task_metrics).await });
    WriterHandle { metrics, task }
}

#[instrument(name = "writer_loop", skip_all, fields(sink = %sink.name()))]
async fn writer_loop<S: RecordSink>(
    queue: FrameQueue,
    policy: WindowPolicy,
    mut sink: S,
    metrics: Arc<SinkMetrics>,
) -> WriterOutcome {
    debug!("writer started");

    let mut persisted: u64 = 0;
    let mut failure: Option<CaptureError> = None;

    while let Some(frame) = queue.take().await {
        match policy.decide(sink.window_started_at(), frame.timestamp_ms) {
            RotationDecision::OpenFirst | RotationDecision::Rotate => {
                if let Err(e) = sink.open_window(frame.timestamp_ms).await {
                    metrics.inc_failure_count();
                    failure = Some(e);
                    break;
                }
                metrics.inc_windows_rotated();
                record_window_rotated();
            }
            RotationDecision::Continue => {}
        }

        let started = Instant::now();
        match sink.write(&frame).await {
            Ok(()) => {
                persisted += 1;
                metrics.inc_write_count();
                record_frame_persisted(started.elapsed().as_secs_f64() * 1000.0);
            }
            Err(e) => {
                metrics.inc_failure_count();
                failure = Some(e);
                break;
            }
        }
    }

    if failure.is_some() {
        // Fatal: reject further production; frames already queued are not
        // persisted past the fault
        queue.close();
    }

    // Cleanup. Close is idempotent, so this is safe even if the failure
    // happened during a rotation that already closed the window.
    if let Err(e) = sink.flush().await {
        error!(error = %e, "flush failed on shutdown");
        failure.get_or_insert(e);
    }
    if let Err(e) = sink.close().await {
        error!(error = %e, "close failed on shutdown");
        failure.get_or_insert(e);
    }

    debug!(persisted, windows = sink.windows_closed(), "writer stopped");

    WriterOutcome {
        frames_persisted: persisted,
        windows_closed: sink.windows_closed(),
        last_window: sink.last_window().map(PathBuf::from),
        failure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use contracts::{Frame, ImagePayload, PixelFormat, TimestampClock};
    use std::path::Path;

    fn frame(id: u64, timestamp_ms: f64) -> Frame {
        Frame {
            id,
            timestamp_ms,
            clock: TimestampClock::Hardware,
            payload: ImagePayload {
                width: 1,
                height: 1,
                format: PixelFormat::Mono8,
                data: Bytes::from_static(&[0]),
            },
        }
    }

    /// Sink that can be told to fail from a given frame id on
    struct MockSink {
        fail_from: Option<u64>,
        window_started_ms: Option<f64>,
        windows_closed: u64,
    }

    impl MockSink {
        fn new(fail_from: Option<u64>) -> Self {
            Self {
                fail_from,
                window_started_ms: None,
                windows_closed: 0,
            }
        }
    }

    impl RecordSink for MockSink {
        fn name(&self) -> &str {
            "mock"
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

        async fn open_window(&mut self, start_ms: f64) -> Result<(), CaptureError> {
            if self.window_started_ms.take().is_some() {
                self.windows_closed += 1;
            }
            self.window_started_ms = Some(start_ms);
            Ok(())
        }

        async fn write(&mut self, frame: &Frame) -> Result<(), CaptureError> {
            if self.fail_from.is_some_and(|from| frame.id >= from) {
                return Err(CaptureError::sink_write("mock", "disk full"));
            }
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), CaptureError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), CaptureError> {
            if self.window_started_ms.take().is_some() {
                self.windows_closed += 1;
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn drains_queue_then_closes_window() {
        let queue = FrameQueue::bounded(16);
        let handle = spawn_writer(queue.clone(), WindowPolicy::new(1_000), MockSink::new(None));

        for id in 1..=5 {
            queue.put(frame(id, id as f64)).await.unwrap();
        }
        queue.close();

        let outcome = handle.join().await;
        assert!(outcome.failure.is_none());
        assert_eq!(outcome.frames_persisted, 5);
        assert_eq!(outcome.windows_closed, 1);
    }

    #[tokio::test]
    async fn rotates_per_policy() {
        let queue = FrameQueue::bounded(64);
        let handle = spawn_writer(queue.clone(), WindowPolicy::new(100), MockSink::new(None));

        // Timestamps 0,10,...,290: exactly 3 windows of 10 frames
        for id in 1..=30u64 {
            queue.put(frame(id, (id - 1) as f64 * 10.0)).await.unwrap();
        }
        queue.close();

        let outcome = handle.join().await;
        assert_eq!(outcome.frames_persisted, 30);
        assert_eq!(outcome.windows_closed, 3);
    }

    #[tokio::test]
    async fn sink_failure_halts_the_queue() {
        let queue = FrameQueue::bounded(16);
        let handle = spawn_writer(queue.clone(), WindowPolicy::new(1_000), MockSink::new(Some(4)));

        // The writer may observe the failure and close the queue while these
        // are still going in; late puts failing is expected
        for id in 1..=6 {
            let _ = queue.put(frame(id, id as f64)).await;
        }

        let outcome = handle.join().await;
        assert_eq!(outcome.frames_persisted, 3);
        assert!(matches!(
            outcome.failure,
            Some(CaptureError::SinkWrite { .. })
        ));
        assert!(queue.is_closed());
    }
}
