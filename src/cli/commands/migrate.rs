//! Implementation of the `issuegate migrate` command.

use anyhow::{Context, Result};

use crate::adapters::sqlite::initialize_database;
use crate::domain::models::Config;

pub async fn execute(config: Config) -> Result<()> {
    let pool = initialize_database(&config.database)
        .await
        .context("Failed to initialize database")?;

    tracing::info!(path = %config.database.path, "Database migrations applied");
    pool.close().await;
    Ok(())
}
