//! Command-line interface.

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

#[derive(Parser, Debug)]
#[command(name = "issuegate")]
#[command(about = "Multi-tenant GitHub App gateway for organization-scoped issues", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: issuegate.yaml, then issuegate.local.yaml)
    #[arg(short, long, global = true, env = "ISSUEGATE_CONFIG_FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply migrations and serve the HTTP API
    Serve(commands::serve::ServeArgs),

    /// Apply database migrations and exit
    Migrate,
}

impl Cli {
    /// Load and validate the configuration this invocation points at.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        match &self.config {
            Some(path) => ConfigLoader::load_from_file(path),
            None => ConfigLoader::load(),
        }
    }
}
