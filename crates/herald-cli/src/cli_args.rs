use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use herald_notify::NotificationTransport;

#[derive(Debug, Parser)]
#[command(
    name = "herald",
    about = "Announce captured sessions once and keep their notification up to date",
    version
)]
/// Public struct `Cli` used across Herald components.
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Feed session observations to the notifier, in file order.
    Notify {
        #[arg(long, env = "HERALD_CONFIG", help = "Path to the notifier JSON config")]
        config: PathBuf,

        #[arg(
            long,
            help = "JSON array or JSON-lines file of session observations"
        )]
        observations: PathBuf,

        #[arg(
            long,
            value_enum,
            help = "Channel to deliver through; defaults to the first enabled channel"
        )]
        channel: Option<CliTransport>,

        #[arg(long, help = "Print the session state snapshot after processing")]
        report: bool,
    },
    /// Print the masked channel configuration.
    Status {
        #[arg(long, env = "HERALD_CONFIG", help = "Path to the notifier JSON config")]
        config: PathBuf,
    },
    /// Print the consolidated token attachment for one observation.
    Consolidate {
        #[arg(long, help = "JSON file holding a single session observation")]
        observation: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliTransport {
    Telegram,
    Discord,
}

impl From<CliTransport> for NotificationTransport {
    fn from(value: CliTransport) -> Self {
        match value {
            CliTransport::Telegram => NotificationTransport::Telegram,
            CliTransport::Discord => NotificationTransport::Discord,
        }
    }
}
