//! Configuration validation
//!
//! Rules:
//! - queue.capacity > 0
//! - window.duration_ms > 0
//! - source.poll_timeout_ms > 0
//! - synthetic source: frequency_hz > 0, jitter_ms >= 0, image dims > 0
//! - replay source: replay.path set, speed_multiplier >= 0
//! - session.root non-empty

use contracts::{CaptureBlueprint, CaptureError, SourceKind};

/// Validate a CaptureBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &CaptureBlueprint) -> Result<(), CaptureError> {
    validate_session(blueprint)?;
    validate_queue(blueprint)?;
    validate_window(blueprint)?;
    validate_source(blueprint)?;
    Ok(())
}

fn validate_session(blueprint: &CaptureBlueprint) -> Result<(), CaptureError> {
    if blueprint.session.root.as_os_str().is_empty() {
        return Err(CaptureError::config_validation(
            "session.root",
            "must not be empty",
        ));
    }
    Ok(())
}

fn validate_queue(blueprint: &CaptureBlueprint) -> Result<(), CaptureError> {
    if blueprint.queue.capacity == 0 {
        return Err(CaptureError::config_validation(
            "queue.capacity",
            "must be > 0",
        ));
    }
    Ok(())
}

fn validate_window(blueprint: &CaptureBlueprint) -> Result<(), CaptureError> {
    if blueprint.window.duration_ms == 0 {
        return Err(CaptureError::config_validation(
            "window.duration_ms",
            "must be > 0",
        ));
    }
    Ok(())
}

fn validate_source(blueprint: &CaptureBlueprint) -> Result<(), CaptureError> {
    let source = &blueprint.source;

    if source.poll_timeout_ms == 0 {
        return Err(CaptureError::config_validation(
            "source.poll_timeout_ms",
            "must be > 0",
        ));
    }

    match source.kind {
        SourceKind::Synthetic => {
            if source.frequency_hz <= 0.0 || !source.frequency_hz.is_finite() {
                return Err(CaptureError::config_validation(
                    "source.frequency_hz",
                    "must be a positive finite number",
                ));
            }
            if source.jitter_ms < 0.0 || !source.jitter_ms.is_finite() {
                return Err(CaptureError::config_validation(
                    "source.jitter_ms",
                    "must be >= 0",
                ));
            }
            if source.image.width == 0 || source.image.height == 0 {
                return Err(CaptureError::config_validation(
                    "source.image",
                    "width and height must be > 0",
                ));
            }
        }
        SourceKind::Replay => {
            if source.replay.path.is_none() {
                return Err(CaptureError::config_validation(
                    "source.replay.path",
                    "required when source.kind = \"replay\"",
                ));
            }
            if source.replay.speed_multiplier < 0.0 {
                return Err(CaptureError::config_validation(
                    "source.replay.speed_multiplier",
                    "must be >= 0",
                ));
            }
        }
    }

    Ok(())
}
