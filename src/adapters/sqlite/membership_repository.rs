//! SQLite implementation of the MembershipRepository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Membership, MembershipRole, NewMembership};
use crate::domain::ports::MembershipRepository;

use super::parse_datetime;

pub struct SqliteMembershipRepository {
    pool: SqlitePool,
}

impl SqliteMembershipRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipRepository for SqliteMembershipRepository {
    async fn create(&self, membership: &NewMembership) -> DomainResult<(Membership, bool)> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"INSERT INTO organization_users (user_id, organization_id, role, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT(user_id, organization_id) DO NOTHING"#
        )
        .bind(membership.user_id)
        .bind(membership.organization_id)
        .bind(membership.role.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let stored = self
            .find_by_user_and_org(membership.user_id, membership.organization_id)
            .await?
            .ok_or(DomainError::MembershipNotFound {
                user_id: membership.user_id,
                organization_id: membership.organization_id,
            })?;

        Ok((stored, result.rows_affected() == 1))
    }

    async fn get(&self, id: i64) -> DomainResult<Option<Membership>> {
        let row: Option<MembershipRow> = sqlx::query_as(
            "SELECT * FROM organization_users WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.try_into()).transpose()
    }

    async fn find_by_user_and_org(
        &self,
        user_id: i64,
        organization_id: i64,
    ) -> DomainResult<Option<Membership>> {
        let row: Option<MembershipRow> = sqlx::query_as(
            "SELECT * FROM organization_users WHERE user_id = ? AND organization_id = ?"
        )
        .bind(user_id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.try_into()).transpose()
    }

    async fn update_role(
        &self,
        user_id: i64,
        organization_id: i64,
        role: MembershipRole,
    ) -> DomainResult<Membership> {
        let result = sqlx::query(
            "UPDATE organization_users SET role = ?, updated_at = ? WHERE user_id = ? AND organization_id = ?"
        )
        .bind(role.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(user_id)
        .bind(organization_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MembershipNotFound { user_id, organization_id });
        }

        self.find_by_user_and_org(user_id, organization_id)
            .await?
            .ok_or(DomainError::MembershipNotFound { user_id, organization_id })
    }

    async fn delete(&self, user_id: i64, organization_id: i64) -> DomainResult<()> {
        let result = sqlx::query(
            "DELETE FROM organization_users WHERE user_id = ? AND organization_id = ?"
        )
        .bind(user_id)
        .bind(organization_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MembershipNotFound { user_id, organization_id });
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct MembershipRow {
    id: i64,
    user_id: i64,
    organization_id: i64,
    role: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<MembershipRow> for Membership {
    type Error = DomainError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        let role = MembershipRole::from_str(&row.role)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid role: {}", row.role)))?;

        Ok(Membership {
            id: row.id,
            user_id: row.user_id,
            organization_id: row.organization_id,
            role,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use crate::adapters::sqlite::test_support::{insert_organization, insert_user};

    async fn setup() -> (SqliteMembershipRepository, i64, i64) {
        let pool = create_migrated_test_pool().await.unwrap();
        let org_id = insert_organization(&pool).await;
        let user_id = insert_user(&pool, "alice@example.com").await;
        (SqliteMembershipRepository::new(pool), user_id, org_id)
    }

    #[tokio::test]
    async fn test_create_is_unique_per_pair() {
        let (repo, user_id, org_id) = setup().await;

        let admin = NewMembership { user_id, organization_id: org_id, role: MembershipRole::Admin };
        let (first, inserted) = repo.create(&admin).await.unwrap();
        assert!(inserted);
        assert!(first.is_admin());

        let regular = NewMembership { role: MembershipRole::Regular, ..admin };
        let (second, inserted_again) = repo.create(&regular).await.unwrap();
        assert!(!inserted_again);
        assert_eq!(second.id, first.id);
        assert_eq!(second.role, MembershipRole::Admin);
    }

    #[tokio::test]
    async fn test_update_role_and_delete() {
        let (repo, user_id, org_id) = setup().await;
        repo.create(&NewMembership { user_id, organization_id: org_id, role: MembershipRole::Regular })
            .await
            .unwrap();

        let promoted = repo.update_role(user_id, org_id, MembershipRole::Admin).await.unwrap();
        assert!(promoted.is_admin());

        repo.delete(user_id, org_id).await.unwrap();
        assert!(repo.find_by_user_and_org(user_id, org_id).await.unwrap().is_none());

        let err = repo.delete(user_id, org_id).await.unwrap_err();
        assert!(matches!(err, DomainError::MembershipNotFound { .. }));
    }
}
