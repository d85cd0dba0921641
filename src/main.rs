//! Command-line interface for the synthetic file load generator.
//!
//! # Usage Examples
//!
//! ```bash
//! # 100 files spread evenly across 45 minutes, then exit
//! ingest-loadgen --duration 45min --count 100
//!
//! # Repeat 1h30m cycles into a custom directory until Ctrl-C
//! ingest-loadgen --duration "1hr 30m" --count 500 \
//!   --base-path /var/tmp/ingest --repeat
//! ```

use anyhow::Context;
use clap::Parser;
use ingest_loadgen::{
    ensure_layout, install_signal_handler, parse_duration, ErrorLog, Generator, GeneratorConfig,
    MetricsLog, DEFAULT_FAILURE_PROBABILITY, DEFAULT_MAX_SIZE,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ingest-loadgen")]
#[command(
    about = "Generates randomly-sized placeholder files at a fixed cadence to feed an ingestion pipeline under test"
)]
struct Cli {
    /// Total cycle duration (e.g. '1hr 30m', '45min')
    #[arg(long, short = 'd')]
    duration: String,

    /// Number of files to generate per cycle
    #[arg(long, short = 'c')]
    count: u64,

    /// Base directory; files land in <base>/input, logs in <base>/logs
    #[arg(long, default_value = "ingest", env = "LOADGEN_BASE_PATH")]
    base_path: PathBuf,

    /// Repeat cycles indefinitely until interrupted
    #[arg(long)]
    repeat: bool,

    /// Maximum payload size in bytes (sizes are uniform in [1, max])
    #[arg(long, default_value_t = DEFAULT_MAX_SIZE)]
    max_size: u64,

    /// Probability of a simulated write failure per file
    #[arg(long, default_value_t = DEFAULT_FAILURE_PROBABILITY)]
    failure_probability: f64,

    /// Random seed for deterministic payloads (same seed = same bytes)
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ingest_loadgen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let total_seconds = parse_duration(&cli.duration)?;
    let (input_dir, logs_dir) = ensure_layout(&cli.base_path).with_context(|| {
        format!(
            "Failed to prepare directories under {}",
            cli.base_path.display()
        )
    })?;

    let metrics =
        MetricsLog::open(logs_dir.join("metrics.log")).context("Failed to open metrics log")?;
    let errors =
        ErrorLog::open(logs_dir.join("errors.log")).context("Failed to open error log")?;
    let stop = install_signal_handler();

    info!(
        "Writing files to {} (cycle: {}s, count: {}, repeat: {})",
        input_dir.display(),
        total_seconds,
        cli.count,
        cli.repeat
    );

    let config = GeneratorConfig {
        input_dir,
        max_size: cli.max_size,
        failure_probability: cli.failure_probability,
        seed: cli.seed,
    };
    let mut generator = Generator::new(config, metrics, errors, stop);
    let (count, repeat) = (cli.count, cli.repeat);

    let summary = tokio::task::spawn_blocking(move || generator.run(total_seconds, count, repeat))
        .await
        .context("Generator task panicked")??;

    info!(
        "Done: {} files ({} bytes) in {:?}, {} failures, {} cycles",
        summary.files_created,
        summary.bytes_written,
        summary.total_duration,
        summary.failures,
        summary.cycles_completed
    );
    Ok(())
}
