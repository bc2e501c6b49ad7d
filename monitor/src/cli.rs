use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "pricewatch", version, about = "Price breach monitor with Telegram alerts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Start the scheduled monitor (default)
    Run,

    /// Fetch one price and compare it to the target. Never sends alerts.
    Price {
        /// Print the quote as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Settings,

    /// Send a fixed phrase through the voice channel
    TestVoice,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}
