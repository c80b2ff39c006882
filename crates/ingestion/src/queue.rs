//! FrameQueue - fixed-capacity FIFO hand-off buffer

use std::sync::Arc;

use async_channel::{bounded, Receiver, Sender, TrySendError};
use contracts::{CaptureError, Frame};
use metrics::gauge;
use tracing::trace;

use crate::metrics::IngestionMetrics;

/// Outcome of a non-blocking enqueue attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// Frame is in the queue
    Accepted,
    /// Queue was at capacity; frame discarded and counted
    Dropped,
    /// Queue is closed; no further frames can be accepted
    Closed,
}

/// Fixed-capacity, thread-safe hand-off buffer between the acquisition
/// producer and the writer task.
///
/// Capacity is set once at construction and immutable afterward. Frames are
/// dequeued in the exact order enqueued; the channel never loses a frame
/// except through the explicit drop policy (`try_put`).
///
/// Cloning is cheap and shares the same underlying channel.
#[derive(Clone)]
pub struct FrameQueue {
    tx: Sender<Frame>,
    rx: Receiver<Frame>,
    metrics: Arc<IngestionMetrics>,
}

impl FrameQueue {
    /// Create a queue holding at most `capacity` frames.
    ///
    /// `capacity` must be > 0; validated upstream by the config loader.
    pub fn bounded(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        Self {
            tx,
            rx,
            metrics: Arc::new(IngestionMetrics::new()),
        }
    }

    /// Shared counters for this queue
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        // Always bounded; async_channel reports None only for unbounded
        self.tx.capacity().unwrap_or(usize::MAX)
    }

    /// Current queue depth
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    /// Whether the queue currently holds no frames
    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    /// Enqueue a frame, suspending the caller while the queue is at capacity.
    ///
    /// This is the backpressure path: the producer stalls rather than losing
    /// a captured frame.
    ///
    /// # Errors
    /// `CaptureError::QueueClosed` if the consumer is gone.
    pub async fn put(&self, frame: Frame) -> Result<(), CaptureError> {
        let frame_id = frame.id;
        self.tx
            .send(frame)
            .await
            .map_err(|_| CaptureError::QueueClosed)?;
        self.metrics.record_accepted();
        self.publish_depth();
        trace!(frame_id, "frame enqueued");
        Ok(())
    }

    /// Enqueue without suspending. A full queue drops the frame.
    pub fn try_put(&self, frame: Frame) -> PutOutcome {
        let frame_id = frame.id;
        match self.tx.try_send(frame) {
            Ok(()) => {
                self.metrics.record_accepted();
                self.publish_depth();
                trace!(frame_id, "frame enqueued");
                PutOutcome::Accepted
            }
            Err(TrySendError::Full(_)) => {
                self.metrics.record_dropped();
                trace!(frame_id, "queue full, frame dropped");
                PutOutcome::Dropped
            }
            Err(TrySendError::Closed(_)) => PutOutcome::Closed,
        }
    }

    /// Dequeue the next frame, suspending while the queue is empty.
    ///
    /// Returns `None` once the queue is closed and fully drained; after that
    /// no further calls should be made.
    pub async fn take(&self) -> Option<Frame> {
        let frame = self.rx.recv().await.ok();
        self.publish_depth();
        frame
    }

    /// Signal end-of-stream.
    ///
    /// Buffered frames stay takeable; once drained, `take` returns `None`.
    /// Unlike `try_put`, this signal cannot be dropped.
    pub fn close(&self) {
        self.tx.close();
    }

    /// Whether the queue has been closed
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn publish_depth(&self) {
        let len = self.tx.len();
        self.metrics.update_queue_len(len);
        gauge!("burstcap_queue_depth").set(len as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ImagePayload, PixelFormat, TimestampClock};
    use std::time::Duration;
    use tokio::time::timeout;

    fn frame(id: u64) -> Frame {
        Frame {
            id,
            timestamp_ms: id as f64 * 10.0,
            clock: TimestampClock::Hardware,
            payload: ImagePayload::solid(2, 2, PixelFormat::Mono8, id as u8),
        }
    }

    #[tokio::test]
    async fn preserves_fifo_order() {
        let queue = FrameQueue::bounded(8);
        for id in 1..=5 {
            queue.put(frame(id)).await.unwrap();
        }
        for id in 1..=5 {
            assert_eq!(queue.take().await.unwrap().id, id);
        }
    }

    #[tokio::test]
    async fn put_blocks_exactly_at_capacity() {
        let queue = FrameQueue::bounded(2);
        queue.put(frame(1)).await.unwrap();
        queue.put(frame(2)).await.unwrap();

        // Third put must not complete while the queue holds 2 frames
        let mut third = Box::pin(queue.put(frame(3)));
        assert!(
            timeout(Duration::from_millis(50), third.as_mut())
                .await
                .is_err(),
            "put returned despite full queue"
        );

        // Freeing one slot unblocks it
        assert_eq!(queue.take().await.unwrap().id, 1);
        timeout(Duration::from_millis(200), third)
            .await
            .expect("put should unblock after take")
            .unwrap();

        assert_eq!(queue.metrics().snapshot().frames_accepted, 3);
    }

    #[tokio::test]
    async fn try_put_drops_when_full() {
        let queue = FrameQueue::bounded(2);
        assert_eq!(queue.try_put(frame(1)), PutOutcome::Accepted);
        assert_eq!(queue.try_put(frame(2)), PutOutcome::Accepted);
        assert_eq!(queue.try_put(frame(3)), PutOutcome::Dropped);
        assert_eq!(queue.try_put(frame(4)), PutOutcome::Dropped);

        let snapshot = queue.metrics().snapshot();
        assert_eq!(snapshot.frames_accepted, 2);
        assert_eq!(snapshot.frames_dropped, 2);

        // The two accepted frames are intact and ordered
        assert_eq!(queue.take().await.unwrap().id, 1);
        assert_eq!(queue.take().await.unwrap().id, 2);
    }

    #[tokio::test]
    async fn close_drains_before_ending_stream() {
        let queue = FrameQueue::bounded(8);
        for id in 1..=3 {
            queue.put(frame(id)).await.unwrap();
        }
        queue.close();

        // Buffered frames survive the close
        assert_eq!(queue.take().await.unwrap().id, 1);
        assert_eq!(queue.take().await.unwrap().id, 2);
        assert_eq!(queue.take().await.unwrap().id, 3);
        assert!(queue.take().await.is_none());
    }

    #[tokio::test]
    async fn put_after_close_reports_closed() {
        let queue = FrameQueue::bounded(4);
        queue.close();
        assert!(matches!(
            queue.put(frame(1)).await,
            Err(CaptureError::QueueClosed)
        ));
        assert_eq!(queue.try_put(frame(2)), PutOutcome::Closed);
    }
}
