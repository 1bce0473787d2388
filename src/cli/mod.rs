//! CLI module for the sandbox client.
//!
//! This module provides command-line interface functionality including:
//! - Argument parsing
//! - Backend command execution
//!
//! # Usage
//!
//! ```ignore
//! use clap::Parser;
//! use sandbox_client::cli::{run_cli_command, Cli};
//!
//! let cli = Cli::parse();
//! let exit = run_cli_command(cli.command).await?;
//! ```

pub mod args;
pub mod commands;

pub use args::{Cli, CliCommand};
pub use commands::{execute, JsonLinesHandler};

use color_eyre::Result;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

use crate::api::SandboxApi;

/// Run a parsed command to completion.
///
/// Configuration is loaded from the environment and the command is cancelled
/// cleanly on Ctrl-C.
pub async fn run_cli_command(command: CliCommand) -> Result<ExitCode> {
    let api = SandboxApi::from_env()?;
    tracing::debug!("Using backend at {}", api.client().config().base_url);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    let mut stdout = std::io::stdout();
    let ok = execute(&api, command, &mut stdout, &cancel).await?;
    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
