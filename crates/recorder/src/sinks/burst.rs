//! BurstSink - per-window image directories with a CSV index
//!
//! On-disk layout, per session root:
//!
//! ```text
//! burst_<tag>/
//!   frame_000001.png
//!   frame_000002.png
//! burst_<tag>.csv        # header: frame_id,timestamp_ms,filename
//! ```
//!
//! An index row is appended only after its image file has been written, so
//! the index never references a missing artifact.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use contracts::{CaptureError, Frame, ImagePayload, PixelFormat, RecordSink};
use tracing::{debug, error, instrument};
use windowing::{burst_dir_name, index_file_name, window_tag};

/// One open output window: image subdirectory plus its index file handle.
struct OpenWindow {
    started_ms: f64,
    dir_name: String,
    image_dir: PathBuf,
    index: csv::Writer<File>,
    frame_count: u64,
}

/// Sink writing each frame as a PNG artifact plus one index row
pub struct BurstSink {
    name: String,
    session_root: PathBuf,
    window: Option<OpenWindow>,
    windows_closed: u64,
    last_window: Option<PathBuf>,
}

impl BurstSink {
    /// Create a new BurstSink rooted at `session_root` (created if absent)
    pub fn new(name: impl Into<String>, session_root: impl Into<PathBuf>) -> io::Result<Self> {
        let session_root = session_root.into();
        fs::create_dir_all(&session_root)?;

        Ok(Self {
            name: name.into(),
            session_root,
            window: None,
            windows_closed: 0,
            last_window: None,
        })
    }

    /// Session root this sink writes under
    pub fn session_root(&self) -> &Path {
        &self.session_root
    }

    /// Frames written into the currently open window
    pub fn open_window_frame_count(&self) -> Option<u64> {
        self.window.as_ref().map(|w| w.frame_count)
    }

    fn open_window_on_disk(&mut self, start_ms: f64) -> io::Result<()> {
        // Flush and close the previous window strictly before creating the
        // next one; never two windows open at once.
        self.close_window_on_disk()?;

        let tag = window_tag(start_ms);
        let dir_name = burst_dir_name(&tag);
        let image_dir = self.session_root.join(&dir_name);
        fs::create_dir_all(&image_dir)?;

        let index_path = self.session_root.join(index_file_name(&tag));
        let mut index = csv::Writer::from_path(&index_path)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        index
            .write_record(["frame_id", "timestamp_ms", "filename"])
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        index.flush()?;

        debug!(sink = %self.name, tag = %tag, start_ms, "window opened");

        self.window = Some(OpenWindow {
            started_ms: start_ms,
            dir_name,
            image_dir,
            index,
            frame_count: 0,
        });
        Ok(())
    }

    fn close_window_on_disk(&mut self) -> io::Result<()> {
        if let Some(mut window) = self.window.take() {
            window.index.flush()?;
            self.windows_closed += 1;
            debug!(
                sink = %self.name,
                window = %window.dir_name,
                frames = window.frame_count,
                "window closed"
            );
            self.last_window = Some(window.image_dir);
        }
        Ok(())
    }

    fn write_frame_to_disk(&mut self, frame: &Frame) -> io::Result<()> {
        let window = self
            .window
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no open window"))?;

        let filename = format!("frame_{:06}.png", frame.id);
        let image_path = window.image_dir.join(&filename);
        save_image(&image_path, &frame.payload)?;

        // Image is on disk; only now does the index learn about it.
        let relative = Path::new(&window.dir_name).join(&filename);
        window
            .index
            .write_record([
                frame.id.to_string(),
                format!("{:.3}", frame.timestamp_ms),
                relative.display().to_string(),
            ])
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        window.frame_count += 1;
        Ok(())
    }
}

fn save_image(path: &Path, payload: &ImagePayload) -> io::Result<()> {
    match payload.format {
        PixelFormat::Mono8 => image::save_buffer(
            path,
            &payload.data,
            payload.width,
            payload.height,
            image::ColorType::L8,
        )
        .map_err(io::Error::other),

        PixelFormat::Rgb8 => image::save_buffer(
            path,
            &payload.data,
            payload.width,
            payload.height,
            image::ColorType::Rgb8,
        )
        .map_err(io::Error::other),

        PixelFormat::Bgra8 => {
            // Convert BGRA to RGBA
            let mut rgba_data = payload.data.to_vec();
            for chunk in rgba_data.chunks_exact_mut(4) {
                chunk.swap(0, 2); // Swap B and R
            }
            image::save_buffer(
                path,
                &rgba_data,
                payload.width,
                payload.height,
                image::ColorType::Rgba8,
            )
            .map_err(io::Error::other)
        }
    }
}

impl RecordSink for BurstSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn window_started_at(&self) -> Option<f64> {
        self.window.as_ref().map(|w| w.started_ms)
    }

    fn windows_closed(&self) -> u64 {
        self.windows_closed
    }

    fn last_window(&self) -> Option<&Path> {
        self.last_window.as_deref()
    }

    #[instrument(
        name = "burst_sink_open_window",
        skip(self),
        fields(sink = %self.name)
    )]
    async fn open_window(&mut self, start_ms: f64) -> Result<(), CaptureError> {
        self.open_window_on_disk(start_ms).map_err(|e| {
            error!(sink = %self.name, start_ms, error = %e, "window open failed");
            CaptureError::sink_write(&self.name, e.to_string())
        })
    }

    #[instrument(
        name = "burst_sink_write",
        skip(self, frame),
        fields(sink = %self.name, frame_id = frame.id)
    )]
    async fn write(&mut self, frame: &Frame) -> Result<(), CaptureError> {
        self.write_frame_to_disk(frame).map_err(|e| {
            error!(sink = %self.name, frame_id = frame.id, error = %e, "write failed");
            CaptureError::sink_write(&self.name, e.to_string())
        })
    }

    #[instrument(name = "burst_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), CaptureError> {
        if let Some(window) = self.window.as_mut() {
            window
                .index
                .flush()
                .map_err(|e| CaptureError::sink_write(&self.name, e.to_string()))?;
        }
        Ok(())
    }

    #[instrument(name = "burst_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), CaptureError> {
        self.close_window_on_disk()
            .map_err(|e| CaptureError::sink_write(&self.name, e.to_string()))
    }
}
