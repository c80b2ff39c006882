//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-crate data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Capture timestamps are milliseconds (f64), taken from the camera's
//!   hardware clock when the driver provides one, else from the host wall clock
//! - Every `Frame` is tagged with which clock produced its timestamp
//! - Frame ids are assigned by the session at enqueue time, contiguous from 1

mod config;
mod error;
mod frame;
mod sink;
mod source;

pub use config::*;
pub use error::*;
pub use frame::*;
pub use sink::*;
pub use source::*;
