//! Implementation of the `issuegate serve` command.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use crate::adapters::github::{AppCredentials, GitHubGateway};
use crate::adapters::http::{AppState, HttpServer};
use crate::adapters::notifier::TracingNotifier;
use crate::adapters::sqlite::initialize_database;
use crate::domain::models::Config;
use crate::infrastructure::crypto::InstallationCipher;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Interface to bind (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides server.port)
    #[arg(short, long)]
    pub port: Option<u16>,
}

pub async fn execute(args: ServeArgs, mut config: Config) -> Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let credentials = Arc::new(
        AppCredentials::from_config(&config.github).context("Failed to load GitHub App credentials")?,
    );
    tracing::info!(
        app_id = credentials.app_id(),
        oauth_client = credentials.has_oauth_client(),
        api_base_url = %config.github.api_base_url,
        "GitHub App credentials loaded"
    );

    let pool = initialize_database(&config.database)
        .await
        .context("Failed to initialize database")?;

    let gateway = Arc::new(GitHubGateway::from_config(&config.github, credentials)?);
    let cipher = Arc::new(InstallationCipher::new(&config.security.app_key));
    let state = AppState::new(
        pool,
        cipher,
        gateway,
        Arc::new(TracingNotifier::new()),
        config.github.issues_per_page,
    );

    HttpServer::new(config.server.clone(), Arc::new(state))
        .serve_with_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
