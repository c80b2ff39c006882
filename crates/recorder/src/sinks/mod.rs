//! Sink implementations

mod burst;
mod log;

pub use burst::BurstSink;
pub use log::LogSink;
