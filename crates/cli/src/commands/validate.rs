//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::{CaptureBlueprint, SinkKind};

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    session_root: String,
    queue_capacity: usize,
    drop_on_full: bool,
    window_duration_ms: u64,
    source_kind: String,
    sink_kind: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    session_root: blueprint.session.root.display().to_string(),
                    queue_capacity: blueprint.queue.capacity,
                    drop_on_full: blueprint.queue.drop_on_full,
                    window_duration_ms: blueprint.window.duration_ms,
                    source_kind: format!("{:?}", blueprint.source.kind),
                    sink_kind: format!("{:?}", blueprint.sink.kind),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &CaptureBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.queue.drop_on_full {
        warnings.push(
            "queue.drop_on_full is enabled - frames will be lost under sustained backpressure"
                .to_string(),
        );
    }

    if blueprint.sink.kind == SinkKind::Log {
        warnings.push("sink.kind = \"log\" - no frames will be persisted to disk".to_string());
    }

    if blueprint.queue.capacity < 16 {
        warnings.push(format!(
            "queue.capacity = {} is very small - the producer will stall on short bursts",
            blueprint.queue.capacity
        ));
    }

    warnings
}


fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("ok: configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Output root: {}", summary.session_root);
            println!("  Queue capacity: {}", summary.queue_capacity);
            println!("  Drop on full: {}", summary.drop_on_full);
            println!("  Window duration: {} ms", summary.window_duration_ms);
            println!("  Source: {}", summary.source_kind);
            println!("  Sink: {}", summary.sink_kind);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\nWarnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("error: configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("  {}", error);
        }
    }
}
