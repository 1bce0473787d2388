use sandbox_client::cli::{run_cli_command, Cli};

use clap::Parser;
use color_eyre::Result;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Log filter used when RUST_LOG is unset.
const DEFAULT_LOG_FILTER: &str = "sandbox_client=info";

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_cli_command(cli.command))
}
