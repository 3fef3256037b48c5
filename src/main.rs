use clap::Parser;
use tracing::{debug, warn};

use gpu_free::config::{Cli, Config};
use gpu_free::gpu::parser::parse_readings;
use gpu_free::gpu::query::GpuQuery;
use gpu_free::report::{self, ReportMode};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments.
    let cli = Cli::parse();

    // Initialize tracing/logging. Diagnostics go to stderr so stdout stays
    // machine-readable; default to warnings only unless RUST_LOG says more.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gpu_free=warn".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Load configuration and resolve effective settings.
    let config = Config::load(&cli.config)?;
    let threshold_mb = config.effective_threshold(&cli);
    let mode = ReportMode::from_cli(&cli);

    debug!(
        binary = %config.query.binary,
        threshold_mb,
        ?mode,
        "gpu-free v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Query and parse. Both failure paths are fatal: the error surfaces on
    // stderr and the process exits non-zero via the Err return.
    let raw = GpuQuery::new(&config.query).run().await?;
    let readings = parse_readings(&raw)?;

    if readings.is_empty() {
        warn!("No GPUs detected");
    }

    // Report.
    let output = report::render(&readings, threshold_mb, mode)?;
    if !output.is_empty() {
        println!("{output}");
    }

    let code = report::exit_code(&readings, threshold_mb, mode);
    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}
