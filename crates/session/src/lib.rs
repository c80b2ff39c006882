//! # Session
//!
//! Top-level orchestrator for one capture run.
//!
//! A `CaptureSession` owns the bounded queue and the single writer task,
//! stamps monotonically increasing frame ids, and implements the
//! shutdown/drain protocol:
//!
//! ```text
//! Initializing -> Running -> Draining -> Closed
//! ```
//!
//! Shutdown is cooperative and drain-based: every frame accepted before the
//! shutdown request is flushed before the session closes. The original
//! global camera/recorder state of the lab scripts is an explicit object
//! here; nothing ambient.

mod manifest;
mod report;
mod session;
mod state;

pub use manifest::SessionManifest;
pub use report::SessionReport;
pub use session::{Admission, CaptureSession};
pub use state::SessionState;
