pub mod genesis;

use clap::{Parser, Subcommand};

use crate::cli::genesis::GenesisConfig;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build a genesis beacon state
    #[command(name = "genesis")]
    Genesis(GenesisConfig),
}
