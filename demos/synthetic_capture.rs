//! Run a synthetic triggered capture for a few seconds and print the report.
//!
//! ```sh
//! cargo run --bin synthetic_capture
//! ```

use std::time::Duration;

use acquisition::SyntheticTriggerSource;
use contracts::CaptureBlueprint;
use session::CaptureSession;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut blueprint = CaptureBlueprint::default();
    blueprint.session.root = "demo_output".into();
    blueprint.window.duration_ms = 1_000;
    blueprint.source.frequency_hz = 30.0;
    blueprint.source.jitter_ms = 5.0;
    blueprint.source.image.width = 64;
    blueprint.source.image.height = 48;

    let source_config = blueprint.source.clone();
    let session = CaptureSession::begin(blueprint)?;
    println!("Capturing 3 seconds of synthetic triggers...");

    let mut source = SyntheticTriggerSource::from_config("synthetic", &source_config);
    let report = session
        .run(&mut source, tokio::time::sleep(Duration::from_secs(3)))
        .await;

    report.print_summary();
    Ok(())
}
