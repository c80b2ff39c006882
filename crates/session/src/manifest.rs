//! Session manifest
//!
//! A `session.json` written once at teardown, recording what the run was
//! configured to do and what it actually did. Companion to the per-window
//! index files; readable without any tooling.

use std::fs::File;
use std::io;
use std::path::Path;

use contracts::TriggerConfig;
use serde::Serialize;
use tracing::debug;

/// Serialized to `<session_root>/session.json` at close
#[derive(Debug, Clone, Serialize)]
pub struct SessionManifest {
    /// RFC 3339 session start time
    pub started_at: String,

    /// RFC 3339 session end time
    pub finished_at: String,

    /// Hardware trigger wiring this session was configured for
    pub trigger: TriggerConfig,

    /// Queue capacity (backpressure threshold)
    pub queue_capacity: usize,

    /// Whether a full queue dropped frames instead of blocking
    pub drop_on_full: bool,

    /// Window rotation interval (ms)
    pub window_duration_ms: u64,

    /// Frames accepted from the acquisition source
    pub frames_accepted: u64,

    /// Frames durably persisted
    pub frames_persisted: u64,

    /// Frames discarded by the overflow policy
    pub frames_dropped: u64,

    /// Frames whose timestamp fell back to the host clock
    pub host_clock_frames: u64,

    /// Output windows flushed and closed
    pub windows_closed: u64,

    /// Last successfully closed window, relative to the session root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_window: Option<String>,

    /// Wall-clock duration in seconds
    pub duration_s: f64,

    /// Error that ended the session early, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl SessionManifest {
    /// Write the manifest into `session_root/session.json`
    pub fn write(&self, session_root: &Path) -> io::Result<()> {
        let path = session_root.join("session.json");
        let file = File::create(&path)?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        debug!(path = %path.display(), "session manifest written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_readable_json() {
        let dir = tempdir().unwrap();
        let manifest = SessionManifest {
            started_at: "2025-01-01T12:00:00+00:00".into(),
            finished_at: "2025-01-01T12:00:30+00:00".into(),
            trigger: TriggerConfig::default(),
            queue_capacity: 200,
            drop_on_full: false,
            window_duration_ms: 12_000,
            frames_accepted: 10,
            frames_persisted: 10,
            frames_dropped: 0,
            host_clock_frames: 2,
            windows_closed: 1,
            last_window: Some("burst_000000_000".into()),
            duration_s: 30.0,
            failure: None,
        };
        manifest.write(dir.path()).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("session.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["frames_persisted"], 10);
        assert_eq!(parsed["trigger"]["line"], "Line1");
        assert!(parsed.get("failure").is_none());
    }
}
