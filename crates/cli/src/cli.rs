//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// burstcap - hardware-triggered camera burst capture pipeline
#[derive(Parser, Debug)]
#[command(
    name = "burstcap",
    author,
    version,
    about = "Triggered-capture recording pipeline",
    long_about = "Records hardware-triggered camera frames into rotating burst windows.\n\n\
                  Frames are buffered through a bounded queue, persisted as PNG \n\
                  artifacts with a synchronized CSV index per window, and drained \n\
                  completely on shutdown."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "BURSTCAP_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "BURSTCAP_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a capture session
    Run(RunArgs),

    /// Validate a configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "config.toml", env = "BURSTCAP_CONFIG")]
    pub config: PathBuf,

    /// Override the base output directory from configuration
    #[arg(long, env = "BURSTCAP_ROOT")]
    pub root: Option<PathBuf>,

    /// Override the queue capacity from configuration
    #[arg(long, env = "BURSTCAP_QUEUE_CAPACITY")]
    pub queue_capacity: Option<usize>,

    /// Override the window rotation interval (ms) from configuration
    #[arg(long, env = "BURSTCAP_WINDOW_MS")]
    pub window_ms: Option<u64>,

    /// Stop the session after this many seconds (0 = run until ctrl-c)
    #[arg(long, default_value = "0", env = "BURSTCAP_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without capturing
    #[arg(long)]
    pub dry_run: bool,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "9000", env = "BURSTCAP_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
