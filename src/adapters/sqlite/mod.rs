//! SQLite database adapters for the issuegate gateway.

pub mod connection;
pub mod invite_repository;
pub mod membership_repository;
pub mod migrations;
pub mod organization_repository;
pub mod user_repository;

pub use connection::{
    create_pool, create_test_pool, database_url, verify_connection, ConnectionError, PoolConfig,
};
pub use invite_repository::SqliteInviteRepository;
pub use membership_repository::SqliteMembershipRepository;
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};
pub use organization_repository::SqliteOrganizationRepository;
pub use user_repository::SqliteUserRepository;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::DatabaseConfig;

/// Parse an RFC3339 datetime string from a SQLite row field.
pub fn parse_datetime(s: &str) -> DomainResult<DateTime<Utc>> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| DomainError::SerializationError(e.to_string()))
        .map(|dt| dt.with_timezone(&Utc))
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),
    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),
}

/// Open the configured database and bring its schema up to date.
pub async fn initialize_database(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    let pool = create_pool(&database_url(&config.path), Some(PoolConfig::from(config))).await?;
    let migrator = Migrator::new(pool.clone());
    migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    Ok(pool)
}

/// Create an in-memory test pool with all migrations applied.
pub async fn create_migrated_test_pool() -> Result<SqlitePool, DatabaseError> {
    let pool = create_test_pool().await?;
    let migrator = Migrator::new(pool.clone());
    migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    Ok(pool)
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use sqlx::SqlitePool;

    pub async fn insert_organization(pool: &SqlitePool) -> i64 {
        let now = Utc::now().to_rfc3339();
        sqlx::query("INSERT INTO organizations (created_at, updated_at) VALUES (?, ?)")
            .bind(&now)
            .bind(&now)
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    pub async fn insert_user(pool: &SqlitePool, email: &str) -> i64 {
        let now = Utc::now().to_rfc3339();
        sqlx::query("INSERT INTO users (name, email, created_at, updated_at) VALUES ('Test', ?, ?, ?)")
            .bind(email)
            .bind(&now)
            .bind(&now)
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }
}
