//! Replay source - re-emit a recorded session
//!
//! Reads the burst index files of a previous session and yields the frames
//! with their original timestamps, optionally paced to the original timing.
//! Useful for reprocessing a capture through a different sink without
//! hardware.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use contracts::{
    Capture, CaptureError, CaptureSource, ImagePayload, PixelFormat, SourcePoll,
};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

/// One row of a burst index file
#[derive(Debug, Clone)]
struct ReplayRecord {
    frame_id: u64,
    timestamp_ms: f64,
    image_path: PathBuf,
}

/// Capture source replaying a recorded session root
pub struct ReplaySource {
    name: String,
    records: Vec<ReplayRecord>,
    cursor: usize,
    /// Playback speed multiplier; 0 = as fast as possible
    speed_multiplier: f64,
    playback: Option<Playback>,
}

/// Wall-clock anchor set when the first frame is emitted
struct Playback {
    started: Instant,
    first_timestamp_ms: f64,
}

impl ReplaySource {
    /// Open a recorded session root (the directory holding `burst_*` entries).
    ///
    /// # Errors
    /// Fails if the directory cannot be listed or an index file is malformed.
    pub fn open(
        name: impl Into<String>,
        session_root: &Path,
        speed_multiplier: f64,
    ) -> Result<Self, CaptureError> {
        let name = name.into();

        let mut index_files: Vec<PathBuf> = fs::read_dir(session_root)
            .map_err(|e| {
                CaptureError::source(&name, format!("cannot read {}: {e}", session_root.display()))
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension().is_some_and(|ext| ext == "csv")
                    && path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with("burst_"))
            })
            .collect();
        // Window tags sort chronologically, so name order is replay order
        index_files.sort();

        let mut records = Vec::new();
        for index_path in &index_files {
            read_index(&name, session_root, index_path, &mut records)?;
        }

        if records.is_empty() {
            warn!(source = %name, root = %session_root.display(), "recording holds no frames");
        } else {
            info!(
                source = %name,
                windows = index_files.len(),
                frames = records.len(),
                "recording loaded"
            );
        }

        Ok(Self {
            name,
            records,
            cursor: 0,
            speed_multiplier,
            playback: None,
        })
    }

    /// Frames not yet replayed
    pub fn remaining(&self) -> usize {
        self.records.len() - self.cursor
    }

    fn load_capture(&self, record: &ReplayRecord) -> Result<Capture, CaptureError> {
        let decoded = image::open(&record.image_path).map_err(|e| {
            CaptureError::source(
                &self.name,
                format!("cannot decode {}: {e}", record.image_path.display()),
            )
        })?;

        let payload = match decoded {
            image::DynamicImage::ImageLuma8(img) => {
                let (width, height) = img.dimensions();
                ImagePayload {
                    width,
                    height,
                    format: PixelFormat::Mono8,
                    data: Bytes::from(img.into_raw()),
                }
            }
            other => {
                let img = other.to_rgb8();
                let (width, height) = img.dimensions();
                ImagePayload {
                    width,
                    height,
                    format: PixelFormat::Rgb8,
                    data: Bytes::from(img.into_raw()),
                }
            }
        };

        Ok(Capture {
            sequence_hint: Some(record.frame_id),
            hardware_timestamp_us: Some((record.timestamp_ms * 1000.0) as u64),
            payload,
        })
    }
}

fn read_index(
    source_name: &str,
    session_root: &Path,
    index_path: &Path,
    records: &mut Vec<ReplayRecord>,
) -> Result<(), CaptureError> {
    let mut reader = csv::Reader::from_path(index_path).map_err(|e| {
        CaptureError::source(
            source_name,
            format!("cannot read {}: {e}", index_path.display()),
        )
    })?;

    for row in reader.records() {
        let row = row.map_err(|e| {
            CaptureError::source(
                source_name,
                format!("bad row in {}: {e}", index_path.display()),
            )
        })?;

        let parse = || -> Option<ReplayRecord> {
            Some(ReplayRecord {
                frame_id: row.get(0)?.parse().ok()?,
                timestamp_ms: row.get(1)?.parse().ok()?,
                image_path: session_root.join(row.get(2)?),
            })
        };
        let record = parse().ok_or_else(|| {
            CaptureError::source(
                source_name,
                format!("bad row in {}: {:?}", index_path.display(), row),
            )
        })?;
        records.push(record);
    }

    debug!(source = %source_name, index = %index_path.display(), "index loaded");
    Ok(())
}

impl CaptureSource for ReplaySource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn poll(&mut self, timeout: Duration) -> Result<SourcePoll, CaptureError> {
        let Some(record) = self.records.get(self.cursor).cloned() else {
            return Ok(SourcePoll::Exhausted);
        };

        if self.speed_multiplier > 0.0 {
            let playback = self.playback.get_or_insert_with(|| Playback {
                started: Instant::now(),
                first_timestamp_ms: record.timestamp_ms,
            });
            let offset_ms =
                (record.timestamp_ms - playback.first_timestamp_ms) / self.speed_multiplier;
            let due = playback.started + Duration::from_secs_f64(offset_ms.max(0.0) / 1000.0);

            let deadline = Instant::now() + timeout;
            if due > deadline {
                sleep_until(deadline).await;
                return Ok(SourcePoll::TimedOut);
            }
            sleep_until(due).await;
        }

        let capture = self.load_capture(&record)?;
        self.cursor += 1;
        Ok(SourcePoll::Captured(capture))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_recording(root: &Path) {
        let dir = root.join("burst_000000_000");
        fs::create_dir_all(&dir).unwrap();
        for (id, fill) in [(1u64, 7u8), (2, 9)] {
            image::save_buffer(
                dir.join(format!("frame_{id:06}.png")),
                &[fill; 4],
                2,
                2,
                image::ColorType::L8,
            )
            .unwrap();
        }
        let mut index = fs::File::create(root.join("burst_000000_000.csv")).unwrap();
        writeln!(index, "frame_id,timestamp_ms,filename").unwrap();
        writeln!(index, "1,0.000,burst_000000_000/frame_000001.png").unwrap();
        writeln!(index, "2,10.000,burst_000000_000/frame_000002.png").unwrap();
    }

    #[tokio::test]
    async fn replays_recorded_frames_in_order() {
        let dir = tempdir().unwrap();
        write_recording(dir.path());

        // speed 0 = no pacing
        let mut source = ReplaySource::open("replay", dir.path(), 0.0).unwrap();
        assert_eq!(source.remaining(), 2);

        match source.poll(Duration::from_millis(10)).await.unwrap() {
            SourcePoll::Captured(c) => {
                assert_eq!(c.sequence_hint, Some(1));
                assert_eq!(c.hardware_timestamp_us, Some(0));
                assert_eq!(c.payload.format, PixelFormat::Mono8);
                assert_eq!(c.payload.data.as_ref(), &[7u8; 4]);
            }
            other => panic!("expected capture, got {other:?}"),
        }
        match source.poll(Duration::from_millis(10)).await.unwrap() {
            SourcePoll::Captured(c) => {
                assert_eq!(c.sequence_hint, Some(2));
                assert_eq!(c.hardware_timestamp_us, Some(10_000));
            }
            other => panic!("expected capture, got {other:?}"),
        }
        assert!(matches!(
            source.poll(Duration::from_millis(10)).await.unwrap(),
            SourcePoll::Exhausted
        ));
    }

    #[tokio::test]
    async fn missing_root_is_a_source_error() {
        let dir = tempdir().unwrap();
        let result = ReplaySource::open("replay", &dir.path().join("nope"), 1.0);
        assert!(matches!(result, Err(CaptureError::Source { .. })));
    }
}
