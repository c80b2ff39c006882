//! CaptureSession - owns the queue, the writer task, and the drain protocol

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use chrono::Local;
use contracts::{
    Capture, CaptureBlueprint, CaptureError, CaptureSource, Frame, OverflowPolicy, RecordSink,
    SinkKind, SourcePoll, TimestampClock,
};
use ingestion::{FrameQueue, PutOutcome};
use observability::{record_frame_accepted, record_frame_dropped, TriggerStatsAggregator};
use recorder::{spawn_writer, BurstSink, LogSink, WriterHandle};
use tracing::{debug, error, info, warn};
use windowing::WindowPolicy;

use crate::manifest::SessionManifest;
use crate::report::SessionReport;
use crate::state::SessionState;

/// What happened to a capture handed to `offer`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Enqueued with this frame id
    Accepted(u64),
    /// Discarded by the overflow policy
    Dropped,
    /// The writer has stopped (sink failure); stop producing and call
    /// `finish` to collect the report
    Halted,
}

/// One capture run: queue + writer task + frame id counter.
///
/// The producer context calls `offer` (or lets `run` drive a source); the
/// writer task is the only consumer. The session is the only owner of both
/// ends, so teardown order is explicit: close the queue, join the writer,
/// write the manifest.
pub struct CaptureSession {
    blueprint: CaptureBlueprint,
    root: PathBuf,
    state: SessionState,
    queue: FrameQueue,
    writer: WriterHandle,
    overflow: OverflowPolicy,
    poll_timeout: Duration,
    next_frame_id: u64,
    frames_accepted: u64,
    frames_dropped: u64,
    host_clock_frames: u64,
    last_sequence_hint: Option<u64>,
    last_clock: Option<TimestampClock>,
    trigger_stats: TriggerStatsAggregator,
    started: Instant,
    started_at: chrono::DateTime<Local>,
}

impl CaptureSession {
    /// Create the session root directory, the queue, and the writer task for
    /// the sink selected in the blueprint.
    pub fn begin(blueprint: CaptureBlueprint) -> Result<Self, CaptureError> {
        let root = Self::session_dir(&blueprint);
        match blueprint.sink.kind {
            SinkKind::Burst => {
                let sink = BurstSink::new("burst", &root)?;
                Self::begin_with(blueprint, root, sink)
            }
            SinkKind::Log => Self::begin_with(blueprint, root, LogSink::new("dry_run")),
        }
    }

    /// Like `begin`, but with a caller-provided sink. Lets tests and embedders
    /// substitute their own sink implementation.
    pub fn begin_with<S>(
        blueprint: CaptureBlueprint,
        root: PathBuf,
        sink: S,
    ) -> Result<Self, CaptureError>
    where
        S: RecordSink + 'static,
    {
        let state = SessionState::Initializing;
        info!(state = %state, root = %root.display(), "session initializing");

        std::fs::create_dir_all(&root)?;

        let queue = FrameQueue::bounded(blueprint.queue.capacity);
        let policy = WindowPolicy::new(blueprint.window.duration_ms);
        let writer = spawn_writer(queue.clone(), policy, sink);

        let session = Self {
            overflow: blueprint.queue.overflow(),
            poll_timeout: Duration::from_millis(blueprint.source.poll_timeout_ms),
            blueprint,
            root,
            state: SessionState::Running,
            queue,
            writer,
            next_frame_id: 1,
            frames_accepted: 0,
            frames_dropped: 0,
            host_clock_frames: 0,
            last_sequence_hint: None,
            last_clock: None,
            trigger_stats: TriggerStatsAggregator::new(),
            started: Instant::now(),
            started_at: Local::now(),
        };
        info!(state = %session.state, "session running");
        Ok(session)
    }

    fn session_dir(blueprint: &CaptureBlueprint) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let dir_name = match &blueprint.session.label {
            Some(label) => format!("{stamp}_{label}"),
            None => stamp,
        };
        blueprint.session.root.join(dir_name)
    }

    /// Session output directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Frames accepted so far
    pub fn frames_accepted(&self) -> u64 {
        self.frames_accepted
    }

    /// Frames discarded by the overflow policy so far
    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped
    }

    /// Stamp a capture with the next frame id and hand it to the queue.
    ///
    /// Ids are consumed only by accepted frames, so persisted ids stay
    /// contiguous regardless of the drop policy.
    pub async fn offer(&mut self, capture: Capture) -> Admission {
        self.note_sequence_gap(&capture);
        let (timestamp_ms, clock) = self.resolve_timestamp(&capture);

        let frame = Frame {
            id: self.next_frame_id,
            timestamp_ms,
            clock,
            payload: capture.payload,
        };

        match self.overflow {
            OverflowPolicy::Block => {
                if self.queue.put(frame).await.is_err() {
                    return self.halt();
                }
            }
            OverflowPolicy::DropNewest => match self.queue.try_put(frame) {
                PutOutcome::Accepted => {}
                PutOutcome::Dropped => {
                    self.frames_dropped += 1;
                    record_frame_dropped();
                    return Admission::Dropped;
                }
                PutOutcome::Closed => return self.halt(),
            },
        }

        let id = self.next_frame_id;
        self.next_frame_id += 1;
        self.frames_accepted += 1;
        if clock == TimestampClock::Host {
            self.host_clock_frames += 1;
        }
        self.trigger_stats.record_trigger(timestamp_ms);
        record_frame_accepted(clock == TimestampClock::Hardware);
        debug!(frame_id = id, timestamp_ms, ?clock, "frame accepted");
        Admission::Accepted(id)
    }

    /// Drive a capture source until it is exhausted, it fails, or the
    /// shutdown future resolves; then drain and close.
    ///
    /// The shutdown future only ever interrupts the poll wait. Once a capture
    /// is in hand, its enqueue runs to completion, so no accepted frame is
    /// lost to the shutdown race. Frames the device delivers after shutdown
    /// are its own to discard; this session no longer polls.
    pub async fn run<S, F>(mut self, source: &mut S, shutdown: F) -> SessionReport
    where
        S: CaptureSource,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut source_failure: Option<CaptureError> = None;

        loop {
            let poll = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("shutdown requested");
                    break;
                }
                poll = source.poll(self.poll_timeout) => poll,
            };

            match poll {
                Ok(SourcePoll::Captured(capture)) => {
                    if self.offer(capture).await == Admission::Halted {
                        break;
                    }
                }
                Ok(SourcePoll::TimedOut) => continue,
                Ok(SourcePoll::Exhausted) => {
                    info!(source = %source.name(), "source exhausted");
                    break;
                }
                Err(e) => {
                    error!(source = %source.name(), error = %e, "acquisition failed");
                    source_failure = Some(e);
                    break;
                }
            }
        }

        self.finish_with(source_failure).await
    }

    /// Enter Draining: close the queue (the guaranteed terminal signal),
    /// wait for the writer to flush every buffered frame and close the last
    /// window, then report.
    pub async fn finish(self) -> SessionReport {
        self.finish_with(None).await
    }

    async fn finish_with(mut self, external_failure: Option<CaptureError>) -> SessionReport {
        self.state = SessionState::Draining;
        info!(state = %self.state, queued = self.queue.len(), "session draining");

        self.queue.close();
        let outcome = self.writer.join().await;

        self.state = SessionState::Closed;
        let duration = self.started.elapsed();
        // A sink failure outranks a source failure in the report; it is the
        // one that determines how much data survived.
        let failure = outcome.failure.or(external_failure);

        let manifest = SessionManifest {
            started_at: self.started_at.to_rfc3339(),
            finished_at: Local::now().to_rfc3339(),
            trigger: self.blueprint.trigger.clone(),
            queue_capacity: self.blueprint.queue.capacity,
            drop_on_full: self.blueprint.queue.drop_on_full,
            window_duration_ms: self.blueprint.window.duration_ms,
            frames_accepted: self.frames_accepted,
            frames_persisted: outcome.frames_persisted,
            frames_dropped: self.frames_dropped,
            host_clock_frames: self.host_clock_frames,
            windows_closed: outcome.windows_closed,
            last_window: outcome
                .last_window
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned()),
            duration_s: duration.as_secs_f64(),
            failure: failure.as_ref().map(|e| e.to_string()),
        };
        if let Err(e) = manifest.write(&self.root) {
            warn!(error = %e, "failed to write session manifest");
        }

        info!(
            state = %self.state,
            accepted = self.frames_accepted,
            persisted = outcome.frames_persisted,
            dropped = self.frames_dropped,
            windows = outcome.windows_closed,
            "session closed"
        );

        SessionReport {
            frames_accepted: self.frames_accepted,
            frames_persisted: outcome.frames_persisted,
            frames_dropped: self.frames_dropped,
            host_clock_frames: self.host_clock_frames,
            windows_closed: outcome.windows_closed,
            last_window: outcome.last_window,
            session_root: self.root,
            duration,
            trigger_stats: self.trigger_stats.summary(),
            failure,
        }
    }

    fn halt(&mut self) -> Admission {
        if self.state == SessionState::Running {
            self.state = SessionState::Draining;
            warn!(state = %self.state, "writer stopped early, rejecting further frames");
        }
        Admission::Halted
    }

    fn resolve_timestamp(&mut self, capture: &Capture) -> (f64, TimestampClock) {
        let (timestamp_ms, clock) = match capture.hardware_timestamp_ms() {
            Some(ms) => (ms, TimestampClock::Hardware),
            None => (host_clock_ms(), TimestampClock::Host),
        };

        if clock == TimestampClock::Host && self.last_clock != Some(TimestampClock::Host) {
            warn!("hardware timestamp unavailable, substituting host wall clock");
        }
        self.last_clock = Some(clock);
        (timestamp_ms, clock)
    }

    fn note_sequence_gap(&mut self, capture: &Capture) {
        if let Some(hint) = capture.sequence_hint {
            if let Some(prev) = self.last_sequence_hint {
                if hint > prev + 1 {
                    warn!(
                        expected = prev + 1,
                        got = hint,
                        "acquisition sequence gap, device may have dropped triggers"
                    );
                }
            }
            self.last_sequence_hint = Some(hint);
        }
    }
}

fn host_clock_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
        * 1000.0
}
