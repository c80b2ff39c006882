//! `info` command implementation.

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::InfoArgs;

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Reading configuration");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let json = config_loader::ConfigLoader::to_json(&blueprint)
            .context("Failed to serialize configuration")?;
        println!("{}", json);
        return Ok(());
    }

    println!("\n=== {} ===\n", args.config.display());
    println!("Session:");
    println!("  Output root: {}", blueprint.session.root.display());
    match &blueprint.session.label {
        Some(label) => println!("  Label: {label}"),
        None => println!("  Label: (none)"),
    }
    println!("\nQueue:");
    println!("  Capacity: {} frames", blueprint.queue.capacity);
    println!(
        "  Overflow: {}",
        if blueprint.queue.drop_on_full {
            "drop newest"
        } else {
            "block producer"
        }
    );
    println!("\nWindow:");
    println!("  Rotation interval: {} ms", blueprint.window.duration_ms);
    println!("\nSource:");
    println!("  Kind: {:?}", blueprint.source.kind);
    println!("  Poll timeout: {} ms", blueprint.source.poll_timeout_ms);
    println!("  Trigger rate: {} Hz", blueprint.source.frequency_hz);
    println!(
        "  Image: {}x{} {:?}",
        blueprint.source.image.width, blueprint.source.image.height, blueprint.source.image.format
    );
    println!("\nTrigger:");
    println!("  Line: {}", blueprint.trigger.line);
    println!("  Activation: {:?}", blueprint.trigger.activation);
    println!("  Exposure: {} us", blueprint.trigger.exposure_time_us);
    println!("\nSink:");
    println!("  Kind: {:?}", blueprint.sink.kind);
    println!();

    Ok(())
}
