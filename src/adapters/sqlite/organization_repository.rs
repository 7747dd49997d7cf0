//! SQLite implementation of the OrganizationRepository.
//!
//! Installation identifiers are encrypted before they reach the table and
//! decrypted when rows are read back; lookups go through the keyed
//! fingerprint column, which is UNIQUE.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{join_labels, split_labels, Organization};
use crate::domain::ports::{ActivatedOrganization, OrganizationRepository};
use crate::infrastructure::crypto::InstallationCipher;

use super::parse_datetime;

pub struct SqliteOrganizationRepository {
    pool: SqlitePool,
    cipher: Arc<InstallationCipher>,
}

impl SqliteOrganizationRepository {
    pub fn new(pool: SqlitePool, cipher: Arc<InstallationCipher>) -> Self {
        Self { pool, cipher }
    }

    async fn get_by_digest(&self, digest: &str) -> DomainResult<Option<Organization>> {
        let row: Option<OrganizationRow> = sqlx::query_as(
            "SELECT * FROM organizations WHERE installation_digest = ?"
        )
        .bind(digest)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_organization(&self.cipher)).transpose()
    }
}

#[async_trait]
impl OrganizationRepository for SqliteOrganizationRepository {
    async fn get(&self, id: i64) -> DomainResult<Option<Organization>> {
        let row: Option<OrganizationRow> = sqlx::query_as(
            "SELECT * FROM organizations WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_organization(&self.cipher)).transpose()
    }

    async fn find_or_create_by_installation(
        &self,
        installation_id: &str,
        name: Option<&str>,
    ) -> DomainResult<ActivatedOrganization> {
        let digest = self.cipher.fingerprint(installation_id);
        let encrypted = self.cipher.encrypt(installation_id)?;
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"INSERT INTO organizations (name, installation_id, installation_digest, mandatory_labels, added_labels, created_at, updated_at)
               VALUES (?, ?, ?, '', '', ?, ?)
               ON CONFLICT(installation_digest) DO NOTHING"#
        )
        .bind(name)
        .bind(&encrypted)
        .bind(&digest)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let organization = self.get_by_digest(&digest).await?.ok_or_else(|| {
            DomainError::DatabaseError("organization vanished after insert".to_string())
        })?;

        Ok(ActivatedOrganization {
            organization,
            created: result.rows_affected() == 1,
        })
    }

    async fn update_labels(
        &self,
        id: i64,
        mandatory_labels: Option<&[String]>,
        added_labels: Option<&[String]>,
    ) -> DomainResult<Organization> {
        // COALESCE keeps the stored list when a side is omitted, so the
        // read-modify-write happens inside one statement.
        let result = sqlx::query(
            r#"UPDATE organizations
               SET mandatory_labels = COALESCE(?, mandatory_labels),
                   added_labels = COALESCE(?, added_labels),
                   updated_at = ?
               WHERE id = ?"#
        )
        .bind(mandatory_labels.map(join_labels))
        .bind(added_labels.map(join_labels))
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::OrganizationNotFound(id));
        }

        self.get(id).await?.ok_or(DomainError::OrganizationNotFound(id))
    }

    async fn list_for_user(&self, user_id: i64) -> DomainResult<Vec<Organization>> {
        let rows: Vec<OrganizationRow> = sqlx::query_as(
            r#"SELECT o.* FROM organizations o
               JOIN organization_users ou ON ou.organization_id = o.id
               WHERE ou.user_id = ?
               ORDER BY o.id"#
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_organization(&self.cipher)).collect()
    }
}

#[derive(sqlx::FromRow)]
struct OrganizationRow {
    id: i64,
    name: Option<String>,
    installation_id: Option<String>,
    #[allow(dead_code)]
    installation_digest: Option<String>,
    mandatory_labels: String,
    added_labels: String,
    created_at: String,
    updated_at: String,
}

impl OrganizationRow {
    fn into_organization(self, cipher: &InstallationCipher) -> DomainResult<Organization> {
        let installation_id = self
            .installation_id
            .filter(|value| !value.is_empty())
            .map(|value| cipher.decrypt(&value))
            .transpose()?;

        Ok(Organization {
            id: self.id,
            name: self.name,
            installation_id,
            mandatory_labels: split_labels(&self.mandatory_labels),
            added_labels: split_labels(&self.added_labels),
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;

    async fn setup_test_repo() -> SqliteOrganizationRepository {
        let pool = create_migrated_test_pool().await.unwrap();
        SqliteOrganizationRepository::new(pool, Arc::new(InstallationCipher::new("test-key")))
    }

    #[tokio::test]
    async fn test_find_or_create_is_idempotent() {
        let repo = setup_test_repo().await;

        let first = repo.find_or_create_by_installation("1001", Some("Acme")).await.unwrap();
        let second = repo.find_or_create_by_installation("1001", None).await.unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.organization.id, second.organization.id);
        assert_eq!(second.organization.name.as_deref(), Some("Acme"));
        assert_eq!(second.organization.installation(), Some("1001"));
    }

    #[tokio::test]
    async fn test_installation_is_encrypted_at_rest() {
        let repo = setup_test_repo().await;
        let activated = repo.find_or_create_by_installation("1001", None).await.unwrap();

        let (stored,): (String,) = sqlx::query_as("SELECT installation_id FROM organizations WHERE id = ?")
            .bind(activated.organization.id)
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_ne!(stored, "1001");
        assert!(!stored.contains("1001"));
    }

    #[tokio::test]
    async fn test_update_labels_keeps_omitted_side() {
        let repo = setup_test_repo().await;
        let org = repo.find_or_create_by_installation("1001", None).await.unwrap().organization;

        let mandatory = vec!["triage".to_string(), "customer".to_string()];
        let updated = repo.update_labels(org.id, Some(&mandatory), None).await.unwrap();
        assert_eq!(updated.mandatory_labels, mandatory);
        assert!(updated.added_labels.is_empty());

        let added = vec!["from-portal".to_string()];
        let updated = repo.update_labels(org.id, None, Some(&added)).await.unwrap();
        assert_eq!(updated.mandatory_labels, mandatory);
        assert_eq!(updated.added_labels, added);
    }

    #[tokio::test]
    async fn test_update_labels_unknown_org() {
        let repo = setup_test_repo().await;
        let err = repo.update_labels(99, Some(&[]), None).await.unwrap_err();
        assert!(matches!(err, DomainError::OrganizationNotFound(99)));
    }
}
