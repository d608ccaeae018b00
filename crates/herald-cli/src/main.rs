mod bootstrap;
mod cli_args;
mod commands;

use anyhow::Result;
use clap::Parser;

use crate::cli_args::{Cli, CliCommand};

#[tokio::main]
async fn main() -> Result<()> {
    bootstrap::init_tracing();
    let cli = Cli::parse();
    match cli.command {
        CliCommand::Notify {
            config,
            observations,
            channel,
            report,
        } => {
            commands::run_notify(&config, &observations, channel.map(Into::into), report).await
        }
        CliCommand::Status { config } => commands::run_status(&config),
        CliCommand::Consolidate { observation } => commands::run_consolidate(&observation),
    }
}
