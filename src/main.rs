//! issuegate CLI entry point.

use anyhow::Result;
use clap::Parser;

use issuegate::cli::{commands, Cli, Commands};
use issuegate::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;
    let _logger = LoggerImpl::init(&config.logging)?;

    match cli.command {
        Commands::Serve(args) => commands::serve::execute(args, config).await,
        Commands::Migrate => commands::migrate::execute(config).await,
    }
}
