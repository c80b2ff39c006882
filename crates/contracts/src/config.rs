//! CaptureBlueprint - Config Loader output
//!
//! Describes a complete capture session: output location, queue behavior,
//! window rotation, acquisition source, trigger wiring, sink selection.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::PixelFormat;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete session configuration blueprint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Output location settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Hand-off queue settings
    #[serde(default)]
    pub queue: QueueConfig,

    /// Output window rotation settings
    #[serde(default)]
    pub window: WindowConfig,

    /// Acquisition source settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Hardware trigger wiring. Applied by the device layer (out of scope
    /// here) and recorded verbatim into the session manifest.
    #[serde(default)]
    pub trigger: TriggerConfig,

    /// Sink selection
    #[serde(default)]
    pub sink: SinkConfig,
}

/// Output location settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Base output directory; each session creates a timestamped
    /// subdirectory underneath it
    #[serde(default = "default_session_root")]
    pub root: PathBuf,

    /// Optional label appended to the session directory name
    #[serde(default)]
    pub label: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            root: default_session_root(),
            label: None,
        }
    }
}

fn default_session_root() -> PathBuf {
    PathBuf::from("output")
}

/// Hand-off queue settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Queue capacity (backpressure threshold), must be > 0
    #[serde(default = "default_queue_capacity")]
    pub capacity: usize,

    /// If true, a full queue drops the incoming frame instead of stalling
    /// the producer
    #[serde(default)]
    pub drop_on_full: bool,
}

impl QueueConfig {
    /// Overflow policy implied by `drop_on_full`
    pub fn overflow(&self) -> OverflowPolicy {
        if self.drop_on_full {
            OverflowPolicy::DropNewest
        } else {
            OverflowPolicy::Block
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: default_queue_capacity(),
            drop_on_full: false,
        }
    }
}

fn default_queue_capacity() -> usize {
    200
}

/// Behavior when the queue is at capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Suspend the producer until space frees (no loss)
    #[default]
    Block,
    /// Discard the incoming frame and count it as dropped
    DropNewest,
}

/// Output window rotation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Rotation interval in milliseconds, must be > 0
    #[serde(default = "default_window_duration_ms")]
    pub duration_ms: u64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_window_duration_ms(),
        }
    }
}

fn default_window_duration_ms() -> u64 {
    12_000
}

/// Acquisition source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Which source implementation to run
    #[serde(default)]
    pub kind: SourceKind,

    /// Per-poll timeout in milliseconds
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,

    /// Synthetic only: mean trigger rate (Hz), must be > 0
    #[serde(default = "default_frequency_hz")]
    pub frequency_hz: f64,

    /// Synthetic only: uniform jitter applied to each trigger interval (ms)
    #[serde(default)]
    pub jitter_ms: f64,

    /// Synthetic only: whether the simulated device exposes a hardware clock.
    /// Disable to exercise the host-clock fallback path.
    #[serde(default = "default_true")]
    pub hardware_clock: bool,

    /// Synthetic only: generated image geometry
    #[serde(default)]
    pub image: ImageConfig,

    /// Replay only: recorded session to re-emit
    #[serde(default)]
    pub replay: ReplayConfig,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            poll_timeout_ms: default_poll_timeout_ms(),
            frequency_hz: default_frequency_hz(),
            jitter_ms: 0.0,
            hardware_clock: true,
            image: ImageConfig::default(),
            replay: ReplayConfig::default(),
        }
    }
}

fn default_poll_timeout_ms() -> u64 {
    1_000
}

fn default_frequency_hz() -> f64 {
    50.0
}

fn default_true() -> bool {
    true
}

/// Source implementation selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Paced fake triggers, no hardware required
    #[default]
    Synthetic,
    /// Re-emit a previously recorded session
    Replay,
}

/// Generated image geometry for the synthetic source
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(default = "default_image_width")]
    pub width: u32,

    #[serde(default = "default_image_height")]
    pub height: u32,

    #[serde(default = "default_pixel_format")]
    pub format: PixelFormat,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            width: default_image_width(),
            height: default_image_height(),
            format: default_pixel_format(),
        }
    }
}

fn default_image_width() -> u32 {
    640
}

fn default_image_height() -> u32 {
    480
}

fn default_pixel_format() -> PixelFormat {
    PixelFormat::Mono8
}

/// Replay source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Root directory of a recorded session (contains burst_* entries)
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Playback speed multiplier; 0 = as fast as possible
    #[serde(default = "default_speed_multiplier")]
    pub speed_multiplier: f64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            path: None,
            speed_multiplier: default_speed_multiplier(),
        }
    }
}

fn default_speed_multiplier() -> f64 {
    1.0
}

/// Hardware trigger wiring, recorded into the session manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Physical input line carrying the trigger pulses
    #[serde(default = "default_trigger_line")]
    pub line: String,

    /// Which edge of the pulse fires the capture
    #[serde(default)]
    pub activation: EdgeActivation,

    /// Exposure time per capture in microseconds
    #[serde(default = "default_exposure_time_us")]
    pub exposure_time_us: u64,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            line: default_trigger_line(),
            activation: EdgeActivation::default(),
            exposure_time_us: default_exposure_time_us(),
        }
    }
}

fn default_trigger_line() -> String {
    "Line1".to_string()
}

fn default_exposure_time_us() -> u64 {
    10_000
}

/// Trigger edge selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeActivation {
    #[default]
    RisingEdge,
    FallingEdge,
}

/// Sink selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Which sink implementation receives the frames
    #[serde(default)]
    pub kind: SinkKind,
}

/// Sink implementation selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// Per-window image directories + CSV index (the durable layout)
    #[default]
    Burst,
    /// Log-only sink for dry runs; nothing touches disk
    Log,
}
