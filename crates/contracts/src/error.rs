//! Layered error definitions
//!
//! Categorized by source: config / acquisition / queue / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum CaptureError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Acquisition Errors =====
    /// Acquisition source failure (device gone, replay file unreadable, ...).
    /// A poll timeout is NOT an error and never surfaces here.
    #[error("acquisition source '{source_name}' error: {message}")]
    Source {
        source_name: String,
        message: String,
    },

    // ===== Queue Errors =====
    /// The writer side of the queue is gone; no further frames can be accepted
    #[error("frame queue closed")]
    QueueClosed,

    // ===== Sink Errors =====
    /// Sink write error. Fatal for the current window.
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl CaptureError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create acquisition source error
    pub fn source(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
