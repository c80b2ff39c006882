//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use acquisition::{ReplaySource, SyntheticTriggerSource};
use contracts::{CaptureBlueprint, SourceKind};
use session::{CaptureSession, SessionReport};

use crate::cli::RunArgs;

/// Execute the `run` command
pub async fn run_capture(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref root) = args.root {
        info!(root = %root.display(), "Overriding output root from CLI");
        blueprint.session.root = root.clone();
    }
    if let Some(capacity) = args.queue_capacity {
        info!(capacity, "Overriding queue capacity from CLI");
        blueprint.queue.capacity = capacity;
    }
    if let Some(window_ms) = args.window_ms {
        info!(window_ms, "Overriding window duration from CLI");
        blueprint.window.duration_ms = window_ms;
    }

    info!(
        root = %blueprint.session.root.display(),
        queue_capacity = blueprint.queue.capacity,
        drop_on_full = blueprint.queue.drop_on_full,
        window_ms = blueprint.window.duration_ms,
        source = ?blueprint.source.kind,
        sink = ?blueprint.sink.kind,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    // Metrics endpoint (optional)
    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
        info!(port = args.metrics_port, "Metrics endpoint available");
    }

    let report = run_session(blueprint, args).await?;
    report.print_summary();

    match report.failure {
        None => {
            info!("burstcap finished");
            Ok(())
        }
        Some(failure) => Err(anyhow::Error::new(failure).context(format!(
            "Session failed after persisting {} frames",
            report.frames_persisted
        ))),
    }
}

async fn run_session(blueprint: CaptureBlueprint, args: &RunArgs) -> Result<SessionReport> {
    let source_config = blueprint.source.clone();
    let session = CaptureSession::begin(blueprint).context("Failed to start capture session")?;

    info!(root = %session.root().display(), "Session started, capturing until shutdown");

    let shutdown = shutdown_signal(args.timeout);

    let report = match source_config.kind {
        SourceKind::Synthetic => {
            let mut source = SyntheticTriggerSource::from_config("synthetic", &source_config);
            session.run(&mut source, shutdown).await
        }
        SourceKind::Replay => {
            let path = source_config
                .replay
                .path
                .as_deref()
                .context("source.replay.path missing")?;
            let mut source =
                ReplaySource::open("replay", path, source_config.replay.speed_multiplier)
                    .context("Failed to open recording for replay")?;
            session.run(&mut source, shutdown).await
        }
    };

    Ok(report)
}

/// Resolve on ctrl-c, SIGTERM, or the optional timeout - whichever first.
///
/// The session keeps draining after this fires; the signal only stops
/// acquisition.
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            warn!("Failed to install ctrl-c handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => {
                warn!("Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let deadline = async {
        if timeout_secs == 0 {
            std::future::pending::<()>().await;
        } else {
            tokio::time::sleep(Duration::from_secs(timeout_secs)).await;
        }
    };

    tokio::select! {
        _ = ctrl_c => info!("ctrl-c received"),
        _ = terminate => info!("SIGTERM received"),
        _ = deadline => info!(timeout_secs, "Session timeout reached"),
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &CaptureBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Session:");
    println!("  Output root: {}", blueprint.session.root.display());
    if let Some(ref label) = blueprint.session.label {
        println!("  Label: {label}");
    }
    println!("\nQueue:");
    println!("  Capacity: {}", blueprint.queue.capacity);
    println!("  Drop on full: {}", blueprint.queue.drop_on_full);
    println!("\nWindow:");
    println!("  Duration: {} ms", blueprint.window.duration_ms);
    println!("\nSource:");
    println!("  Kind: {:?}", blueprint.source.kind);
    println!("  Poll timeout: {} ms", blueprint.source.poll_timeout_ms);
    println!("\nTrigger:");
    println!("  Line: {}", blueprint.trigger.line);
    println!("  Activation: {:?}", blueprint.trigger.activation);
    println!("  Exposure: {} us", blueprint.trigger.exposure_time_us);
    println!("\nSink:");
    println!("  Kind: {:?}", blueprint.sink.kind);
    println!();
}
