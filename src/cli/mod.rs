//! CLI interface for trade-tape
//!
//! Provides subcommands for:
//! - `run`: Relay live trades to the terminal viewer
//! - `config`: Show the effective configuration

mod run;

pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "trade-tape")]
#[command(about = "Live trade tape relay for the Hyperliquid WebSocket feed")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Relay live trades
    Run(RunArgs),
    /// Show configuration
    Config,
}
