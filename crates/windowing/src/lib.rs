//! # Windowing
//!
//! Decides when the current output window closes and a new one opens, and
//! derives the on-disk names a window goes by.
//!
//! The policy is purely time-based: a frame rotates the window iff its
//! capture timestamp is at least `duration_ms` past the window's start. The
//! decision layer holds no file handles; rotation side effects belong to the
//! sink.

mod policy;
mod tag;

pub use policy::{RotationDecision, WindowPolicy};
pub use tag::{burst_dir_name, index_file_name, window_tag};
