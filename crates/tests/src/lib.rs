//! # Integration Tests
//!
//! Cross-crate end-to-end tests, no hardware required.
//!
//! Covers:
//! - Scripted source -> session -> on-disk burst layout
//! - Index/artifact round trips
//! - Backpressure and drop accounting under a paused consumer
//! - Drain-on-shutdown and sink-failure behavior
//! - Recording replay

#[cfg(test)]
mod support {
    use std::sync::Arc;

    use contracts::{CaptureError, Frame, RecordSink};
    use std::path::Path;
    use tokio::sync::Notify;

    /// Wraps a sink, parking the writer task inside `open_window` until the
    /// test releases it. Lets tests hold the consumer still while the queue
    /// fills.
    pub struct GatedSink<S> {
        inner: S,
        entered: Arc<Notify>,
        release: Arc<Notify>,
        armed: bool,
    }

    impl<S> GatedSink<S> {
        pub fn new(inner: S) -> (Self, Arc<Notify>, Arc<Notify>) {
            let entered = Arc::new(Notify::new());
            let release = Arc::new(Notify::new());
            (
                Self {
                    inner,
                    entered: Arc::clone(&entered),
                    release: Arc::clone(&release),
                    armed: true,
                },
                entered,
                release,
            )
        }
    }

    impl<S: RecordSink> RecordSink for GatedSink<S> {
        fn name(&self) -> &str {
            self.inner.name()
        }

        fn window_started_at(&self) -> Option<f64> {
            self.inner.window_started_at()
        }

        fn windows_closed(&self) -> u64 {
            self.inner.windows_closed()
        }

        fn last_window(&self) -> Option<&Path> {
            self.inner.last_window()
        }

        async fn open_window(&mut self, start_ms: f64) -> Result<(), CaptureError> {
            if self.armed {
                self.armed = false;
                self.entered.notify_one();
                self.release.notified().await;
            }
            self.inner.open_window(start_ms).await
        }

        async fn write(&mut self, frame: &Frame) -> Result<(), CaptureError> {
            self.inner.write(frame).await
        }

        async fn flush(&mut self) -> Result<(), CaptureError> {
            self.inner.flush().await
        }

        async fn close(&mut self) -> Result<(), CaptureError> {
            self.inner.close().await
        }
    }

    /// Wraps a sink, failing every write from a given frame id on. The frames
    /// before it reach the inner sink untouched.
    pub struct FailFromSink<S> {
        inner: S,
        fail_from: u64,
    }

    impl<S> FailFromSink<S> {
        pub fn new(inner: S, fail_from: u64) -> Self {
            Self { inner, fail_from }
        }
    }

    impl<S: RecordSink> RecordSink for FailFromSink<S> {
        fn name(&self) -> &str {
            self.inner.name()
        }

        fn window_started_at(&self) -> Option<f64> {
            self.inner.window_started_at()
        }

        fn windows_closed(&self) -> u64 {
            self.inner.windows_closed()
        }

        fn last_window(&self) -> Option<&Path> {
            self.inner.last_window()
        }

        async fn open_window(&mut self, start_ms: f64) -> Result<(), CaptureError> {
            self.inner.open_window(start_ms).await
        }

        async fn write(&mut self, frame: &Frame) -> Result<(), CaptureError> {
            if frame.id >= self.fail_from {
                return Err(CaptureError::sink_write(self.inner.name(), "disk full"));
            }
            self.inner.write(frame).await
        }

        async fn flush(&mut self) -> Result<(), CaptureError> {
            self.inner.flush().await
        }

        async fn close(&mut self) -> Result<(), CaptureError> {
            self.inner.close().await
        }
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::path::Path;
    use std::time::Duration;

    use acquisition::ScriptedSource;
    use contracts::{Capture, CaptureBlueprint, CaptureError, ImagePayload, PixelFormat};
    use recorder::{BurstSink, LogSink};
    use session::{Admission, CaptureSession};
    use tempfile::tempdir;
    use tokio::time::timeout;

    use crate::support::{FailFromSink, GatedSink};

    fn blueprint(root: &Path) -> CaptureBlueprint {
        let mut blueprint = CaptureBlueprint::default();
        blueprint.session.root = root.to_path_buf();
        blueprint
    }

    fn capture(ts_ms: f64, fill: u8) -> Capture {
        Capture {
            sequence_hint: None,
            hardware_timestamp_us: Some((ts_ms * 1000.0) as u64),
            payload: ImagePayload::solid(2, 2, PixelFormat::Mono8, fill),
        }
    }

    fn index_files(root: &Path) -> Vec<std::path::PathBuf> {
        let mut files: Vec<_> = fs::read_dir(root)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
            .collect();
        files.sort();
        files
    }

    /// Scripted source -> session -> disk: windows, ids, and pixel round trip.
    #[tokio::test]
    async fn test_e2e_burst_layout_and_round_trip() {
        let dir = tempdir().unwrap();
        let mut bp = blueprint(dir.path());
        bp.window.duration_ms = 100;

        let session = CaptureSession::begin(bp).unwrap();
        let root = session.root().to_path_buf();

        // 30 frames, ts 0,10,...,290 -> windows [0..100), [100..200), [200..300)
        let timestamps: Vec<f64> = (0..30).map(|i| i as f64 * 10.0).collect();
        let mut source = ScriptedSource::from_timestamps("script", &timestamps);

        let report = session.run(&mut source, std::future::pending::<()>()).await;
        assert!(report.is_success());
        assert_eq!(report.frames_accepted, 30);
        assert_eq!(report.frames_persisted, 30);
        assert_eq!(report.windows_closed, 3);

        let indexes = index_files(&root);
        assert_eq!(indexes.len(), 3);

        let mut expected_id = 1u64;
        for index in &indexes {
            let content = fs::read_to_string(index).unwrap();
            let mut lines = content.lines();
            assert_eq!(lines.next().unwrap(), "frame_id,timestamp_ms,filename");

            let mut rows = 0;
            for line in lines {
                let fields: Vec<&str> = line.split(',').collect();
                assert_eq!(fields.len(), 3);

                // Ids are contiguous across all windows, starting at 1
                let id: u64 = fields[0].parse().unwrap();
                assert_eq!(id, expected_id);
                expected_id += 1;

                // Every row references an artifact that exists, with the
                // exact pixel bytes that were enqueued
                let artifact = root.join(fields[2]);
                assert!(artifact.exists(), "missing {}", artifact.display());
                let pixels = image::open(&artifact).unwrap().to_luma8().into_raw();
                let fill = (id - 1) as u8; // ScriptedSource fill is the index
                assert_eq!(pixels, vec![fill; 4]);

                rows += 1;
            }
            assert_eq!(rows, 10);
        }
        assert_eq!(expected_id, 31);
    }

    /// Backpressure: with capacity 5 and the consumer parked, the 6th offer
    /// past the held frame suspends until the consumer resumes, and nothing
    /// is dropped.
    #[tokio::test]
    async fn test_e2e_backpressure_blocks_producer() {
        let dir = tempdir().unwrap();
        let mut bp = blueprint(dir.path());
        bp.queue.capacity = 5;

        let (sink, entered, release) = GatedSink::new(LogSink::new("gated"));
        let root = dir.path().join("run");
        let mut session = CaptureSession::begin_with(bp, root, sink).unwrap();

        // First frame is taken by the writer, which then parks in the gate
        assert_eq!(
            session.offer(capture(0.0, 0)).await,
            Admission::Accepted(1)
        );
        entered.notified().await;

        // Five more fill the queue exactly
        for i in 1..=5u64 {
            assert_eq!(
                session.offer(capture(i as f64, i as u8)).await,
                Admission::Accepted(i + 1)
            );
        }

        // The seventh offer must suspend: queue is at capacity
        let mut blocked = Box::pin(session.offer(capture(6.0, 6)));
        assert!(
            timeout(Duration::from_millis(50), blocked.as_mut())
                .await
                .is_err(),
            "offer completed despite full queue"
        );

        // Resuming the consumer unblocks it
        release.notify_one();
        let admission = timeout(Duration::from_millis(500), blocked)
            .await
            .expect("offer should unblock once the consumer drains");
        assert_eq!(admission, Admission::Accepted(7));

        let report = session.finish().await;
        assert!(report.is_success());
        assert_eq!(report.frames_accepted, 7);
        assert_eq!(report.frames_persisted, 7);
        assert_eq!(report.frames_dropped, 0);
    }

    /// Drop mode: capacity 2, consumer parked holding frame 1; of the next
    /// four offers two fit the queue and two are dropped and counted.
    #[tokio::test]
    async fn test_e2e_drop_on_full_accounting() {
        let dir = tempdir().unwrap();
        let mut bp = blueprint(dir.path());
        bp.queue.capacity = 2;
        bp.queue.drop_on_full = true;

        let (sink, entered, release) = GatedSink::new(LogSink::new("gated"));
        let root = dir.path().join("run");
        let mut session = CaptureSession::begin_with(bp, root, sink).unwrap();

        assert_eq!(
            session.offer(capture(0.0, 0)).await,
            Admission::Accepted(1)
        );
        entered.notified().await;

        let mut outcomes = Vec::new();
        for i in 1..=4u64 {
            outcomes.push(session.offer(capture(i as f64, i as u8)).await);
        }
        assert_eq!(
            outcomes,
            vec![
                Admission::Accepted(2),
                Admission::Accepted(3),
                Admission::Dropped,
                Admission::Dropped,
            ]
        );

        release.notify_one();
        let report = session.finish().await;

        assert!(report.is_success());
        assert_eq!(report.frames_accepted, 3);
        assert_eq!(report.frames_persisted, 3);
        assert_eq!(report.frames_dropped, 2);
        // Conservation: accepted + dropped = everything offered
        assert_eq!(report.frames_accepted + report.frames_dropped, 5);
    }

    /// Shutdown after 7 of 10 planned frames: every accepted frame is
    /// flushed, the window closes, the index holds exactly 7 rows.
    #[tokio::test]
    async fn test_e2e_shutdown_drains_completely() {
        let dir = tempdir().unwrap();
        let bp = blueprint(dir.path());
        let mut session = CaptureSession::begin(bp).unwrap();
        let root = session.root().to_path_buf();

        for i in 0..7u64 {
            session.offer(capture(i as f64 * 10.0, i as u8)).await;
        }
        let report = session.finish().await;

        assert!(report.is_success());
        assert_eq!(report.frames_persisted, 7);
        assert_eq!(report.frames_dropped, 0);
        assert_eq!(report.windows_closed, 1);

        let indexes = index_files(&root);
        assert_eq!(indexes.len(), 1);
        let rows = fs::read_to_string(&indexes[0]).unwrap().lines().count() - 1;
        assert_eq!(rows, 7);
    }

    /// Sink failure on frame 4: three valid rows referencing three valid
    /// artifacts survive, and the failure reaches the report with counts.
    #[tokio::test]
    async fn test_e2e_sink_failure_leaves_valid_prefix() {
        let dir = tempdir().unwrap();
        let bp = blueprint(dir.path());
        let root = dir.path().join("run");
        let sink = FailFromSink::new(BurstSink::new("burst", &root).unwrap(), 4);
        let mut session = CaptureSession::begin_with(bp, root.clone(), sink).unwrap();

        for i in 0..10u64 {
            if session.offer(capture(i as f64 * 10.0, i as u8)).await == Admission::Halted {
                break;
            }
        }
        let report = session.finish().await;

        assert!(!report.is_success());
        assert_eq!(report.frames_persisted, 3);
        assert!(matches!(
            report.failure,
            Some(CaptureError::SinkWrite { .. })
        ));

        // Partial data up to the fault is valid and readable
        let indexes = index_files(&root);
        assert_eq!(indexes.len(), 1);
        let content = fs::read_to_string(&indexes[0]).unwrap();
        let rows: Vec<&str> = content.lines().skip(1).collect();
        assert_eq!(rows.len(), 3);
        for row in rows {
            let artifact = root.join(row.split(',').nth(2).unwrap());
            assert!(artifact.exists());
            image::open(&artifact).unwrap();
        }
    }

    /// A recorded session can be replayed as an acquisition source and lands
    /// frame-for-frame in a new session.
    #[tokio::test]
    async fn test_e2e_replay_round_trip() {
        let dir = tempdir().unwrap();

        // Record
        let bp = blueprint(&dir.path().join("first"));
        let session = CaptureSession::begin(bp).unwrap();
        let recorded_root = session.root().to_path_buf();
        let timestamps: Vec<f64> = (0..5).map(|i| i as f64 * 10.0).collect();
        let mut source = ScriptedSource::from_timestamps("script", &timestamps);
        let report = session.run(&mut source, std::future::pending::<()>()).await;
        assert_eq!(report.frames_persisted, 5);

        // Replay into a second session, unpaced
        let bp = blueprint(&dir.path().join("second"));
        let session = CaptureSession::begin(bp).unwrap();
        let replayed_root = session.root().to_path_buf();
        let mut replay = acquisition::ReplaySource::open("replay", &recorded_root, 0.0).unwrap();
        let report = session.run(&mut replay, std::future::pending::<()>()).await;

        assert!(report.is_success());
        assert_eq!(report.frames_accepted, 5);
        assert_eq!(report.frames_persisted, 5);
        assert_eq!(index_files(&replayed_root).len(), 1);
    }
}
