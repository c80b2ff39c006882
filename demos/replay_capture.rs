//! Replay a recorded session into a fresh one.
//!
//! ```sh
//! cargo run --bin replay_capture -- demo_output/<stamp>
//! ```

use acquisition::ReplaySource;
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

    let recorded = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: replay_capture <recorded session dir>"))?;

    let mut blueprint = CaptureBlueprint::default();
    blueprint.session.root = "demo_output".into();
    blueprint.session.label = Some("replay".into());

    let session = CaptureSession::begin(blueprint)?;
    println!("Replaying {recorded} at original speed...");

    let mut source = ReplaySource::open("replay", std::path::Path::new(&recorded), 1.0)?;
    let report = session.run(&mut source, std::future::pending::<()>()).await;

    report.print_summary();
    Ok(())
}
