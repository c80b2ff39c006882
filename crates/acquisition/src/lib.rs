//! # Acquisition
//!
//! `CaptureSource` implementations standing in for the triggered camera.
//!
//! The real device layer (SDK node configuration, trigger arming) lives
//! outside this system; everything here speaks the same pull-style boundary
//! it would: poll with a timeout, get a capture or "no trigger yet".
//!
//! - `SyntheticTriggerSource`: paced fake triggers for development and demos
//! - `ScriptedSource`: a fixed event list, the workhorse of deterministic tests
//! - `ReplaySource`: re-emits a previously recorded session from its burst
//!   index files

mod replay;
mod scripted;
mod synthetic;

pub use replay::ReplaySource;
pub use scripted::{ScriptedEvent, ScriptedSource};
pub use synthetic::SyntheticTriggerSource;
