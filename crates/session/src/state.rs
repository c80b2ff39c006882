//! Session lifecycle states

use std::fmt;

/// Lifecycle of a capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Session root created, queue and writer constructed, no frames yet
    Initializing,
    /// Accepting frames from the acquisition source
    Running,
    /// Shutdown requested; queue closed, writer draining buffered frames
    Draining,
    /// All resources released; final counts available
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Initializing => "initializing",
            SessionState::Running => "running",
            SessionState::Draining => "draining",
            SessionState::Closed => "closed",
        };
        f.write_str(s)
    }
}
