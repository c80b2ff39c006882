//! # Recorder
//!
//! Per-window durable persistence: sink implementations plus the single
//! writer task that drains the frame queue into them.
//!
//! The writer task is the only context that touches a sink or its file
//! handles, so sinks need no locking. It consumes until the queue signals
//! end-of-stream, closes the last window, and reports a `WriterOutcome`.

mod metrics;
mod sinks;
mod writer;

pub use crate::metrics::{SinkMetrics, SinkMetricsSnapshot};
pub use crate::sinks::{BurstSink, LogSink};
pub use crate::writer::{spawn_writer, WriterHandle, WriterOutcome};
