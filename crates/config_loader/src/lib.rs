//! # Config Loader
//!
//! Configuration loading and parsing.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Produce a `CaptureBlueprint`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("config.toml")).unwrap();
//! println!("queue capacity: {}", blueprint.queue.capacity);
//! ```

mod parser;
mod validator;

pub use contracts::CaptureBlueprint;
pub use parser::ConfigFormat;

use contracts::CaptureError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a file path
    ///
    /// Automatically detects the format from the file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<CaptureBlueprint, CaptureError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from a string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<CaptureBlueprint, CaptureError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }

    /// Serialize a CaptureBlueprint to a TOML string
    pub fn to_toml(blueprint: &CaptureBlueprint) -> Result<String, CaptureError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| CaptureError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize a CaptureBlueprint to a JSON string
    pub fn to_json(blueprint: &CaptureBlueprint) -> Result<String, CaptureError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| CaptureError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer the configuration format from the file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, CaptureError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            CaptureError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext)
            .ok_or_else(|| CaptureError::config_parse(format!("unsupported config format: .{ext}")))
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, CaptureError> {
        Ok(std::fs::read_to_string(path)?)
    }
}
