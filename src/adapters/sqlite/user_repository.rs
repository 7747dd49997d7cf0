//! SQLite implementation of the UserRepository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{normalize_email, NewUser, User, WorkspaceSelection};
use crate::domain::ports::UserRepository;

use super::parse_datetime;

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: &NewUser) -> DomainResult<User> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO users (name, email, created_at, updated_at) VALUES (?, ?, ?, ?)"
        )
        .bind(&user.name)
        .bind(normalize_email(&user.email))
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(email_taken)?;

        let id = result.last_insert_rowid();
        self.get(id).await?.ok_or(DomainError::UserNotFound(id))
    }

    async fn get(&self, id: i64) -> DomainResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.try_into()).transpose()
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.try_into()).transpose()
    }

    async fn update_workspace(&self, id: i64, selection: &WorkspaceSelection) -> DomainResult<User> {
        let result = sqlx::query(
            r#"UPDATE users
               SET organization_id = COALESCE(?, organization_id),
                   default_organization = COALESCE(?, default_organization),
                   default_repo = COALESCE(?, default_repo),
                   updated_at = ?
               WHERE id = ?"#
        )
        .bind(selection.organization_id)
        .bind(&selection.default_organization)
        .bind(&selection.default_repo)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound(id));
        }

        self.get(id).await?.ok_or(DomainError::UserNotFound(id))
    }
}

pub(super) fn email_taken(e: sqlx::Error) -> DomainError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            DomainError::ValidationFailed("email is already registered".to_string())
        }
        other => other.into(),
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct UserRow {
    id: i64,
    name: String,
    email: String,
    organization_id: Option<i64>,
    default_organization: Option<String>,
    default_repo: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            organization_id: row.organization_id,
            default_organization: row.default_organization,
            default_repo: row.default_repo,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use crate::adapters::sqlite::test_support::insert_organization;

    fn new_user(email: &str) -> NewUser {
        NewUser { name: "Alice".to_string(), email: email.to_string() }
    }

    #[tokio::test]
    async fn test_create_normalizes_email_and_rejects_duplicates() {
        let repo = SqliteUserRepository::new(create_migrated_test_pool().await.unwrap());

        let user = repo.create(&new_user("Alice@Example.com")).await.unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert!(user.organization_id.is_none());

        let err = repo.create(&new_user("alice@example.com")).await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));

        let found = repo.find_by_email("ALICE@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn test_update_workspace_only_overwrites_given_fields() {
        let pool = create_migrated_test_pool().await.unwrap();
        let org_id = insert_organization(&pool).await;
        let repo = SqliteUserRepository::new(pool);
        let user = repo.create(&new_user("alice@example.com")).await.unwrap();

        let selected = repo
            .update_workspace(user.id, &WorkspaceSelection {
                organization_id: Some(org_id),
                default_organization: Some("acme".to_string()),
                default_repo: Some("web".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(selected.repository(), Some(("acme", "web")));

        let switched = repo
            .update_workspace(user.id, &WorkspaceSelection {
                default_repo: Some("api".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(switched.organization_id, Some(org_id));
        assert_eq!(switched.repository(), Some(("acme", "api")));
    }
}
