use clap::Parser;
use tracing::Level;

use crate::cli::{Cli, Commands};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Genesis(cmd) => {
            let level = match cmd.verbosity {
                0 => Level::ERROR,
                1 => Level::WARN,
                2 => Level::INFO,
                3 => Level::DEBUG,
                _ => Level::TRACE,
            };
            tracing_subscriber::fmt().with_max_level(level).init();

            cmd.run().await
        }
    }
}
