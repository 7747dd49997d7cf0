//! SQLite implementation of the InviteRepository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    normalize_email, Invite, Membership, MembershipRole, NewUser, Reconciliation, ReconciliationPlan, User,
};
use crate::domain::ports::InviteRepository;

use super::membership_repository::MembershipRow;
use super::user_repository::{email_taken, UserRow};
use super::parse_datetime;

pub struct SqliteInviteRepository {
    pool: SqlitePool,
}

impl SqliteInviteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find_active(&self, email: &str, organization_id: i64) -> DomainResult<Option<Invite>> {
        let row: Option<InviteRow> = sqlx::query_as(
            "SELECT * FROM organization_invites WHERE email = ? AND organization_id = ? AND active = 1"
        )
        .bind(email)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.try_into()).transpose()
    }
}

#[async_trait]
impl InviteRepository for SqliteInviteRepository {
    async fn create(&self, email: &str, organization_id: i64) -> DomainResult<Invite> {
        let email = normalize_email(email);
        if let Some(existing) = self.find_active(&email, organization_id).await? {
            return Ok(existing);
        }

        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"INSERT INTO organization_invites (email, organization_id, active, created_at, updated_at)
               VALUES (?, ?, 1, ?, ?)"#
        )
        .bind(&email)
        .bind(organization_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let row: InviteRow = sqlx::query_as("SELECT * FROM organization_invites WHERE id = ?")
            .bind(result.last_insert_rowid())
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn find_active_by_email(&self, email: &str) -> DomainResult<Vec<Invite>> {
        let rows: Vec<InviteRow> = sqlx::query_as(
            "SELECT * FROM organization_invites WHERE email = ? AND active = 1 ORDER BY created_at, id"
        )
        .bind(normalize_email(email))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn list_active_for_organization(&self, organization_id: i64) -> DomainResult<Vec<Invite>> {
        let rows: Vec<InviteRow> = sqlx::query_as(
            "SELECT * FROM organization_invites WHERE organization_id = ? AND active = 1 ORDER BY created_at, id"
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn apply_reconciliation(&self, plan: &ReconciliationPlan) -> DomainResult<Vec<Membership>> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await.map_err(reconciliation_failed)?;
        let created = apply_plan(&mut *tx, plan, &now).await?;
        tx.commit().await.map_err(reconciliation_failed)?;
        Ok(created)
    }

    async fn create_user_with_invites(&self, user: &NewUser) -> DomainResult<(User, Reconciliation)> {
        let email = normalize_email(&user.email);
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO users (name, email, created_at, updated_at) VALUES (?, ?, ?, ?)"
        )
        .bind(&user.name)
        .bind(&email)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(email_taken)?;
        let user_id = result.last_insert_rowid();

        let rows: Vec<InviteRow> = sqlx::query_as(
            "SELECT * FROM organization_invites WHERE email = ? AND active = 1 ORDER BY created_at, id"
        )
        .bind(&email)
        .fetch_all(&mut *tx)
        .await?;
        let invites = rows
            .into_iter()
            .map(Invite::try_from)
            .collect::<DomainResult<Vec<_>>>()?;

        let reconciliation = match ReconciliationPlan::from_invites(user_id, &invites) {
            Some(plan) => Reconciliation {
                memberships: apply_plan(&mut *tx, &plan, &now).await?,
                primary_organization_id: Some(plan.primary_organization_id),
            },
            None => Reconciliation::default(),
        };

        let row: UserRow = sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok((row.try_into()?, reconciliation))
    }
}

fn reconciliation_failed(e: sqlx::Error) -> DomainError {
    DomainError::Reconciliation(e.to_string())
}

/// Create the memberships, consume the invites and set the primary
/// organization inside the caller's transaction.
async fn apply_plan(
    conn: &mut SqliteConnection,
    plan: &ReconciliationPlan,
    now: &str,
) -> DomainResult<Vec<Membership>> {
    // Claim the invites first. A concurrent reconciliation that got
    // there before us leaves fewer active rows and we roll back.
    let mut claimed = 0;
    for invite_id in &plan.invite_ids {
        let result = sqlx::query(
            "UPDATE organization_invites SET active = 0, updated_at = ? WHERE id = ? AND active = 1"
        )
        .bind(now)
        .bind(invite_id)
        .execute(&mut *conn)
        .await
        .map_err(reconciliation_failed)?;
        claimed += result.rows_affected();
    }
    if claimed != plan.invite_ids.len() as u64 {
        return Err(DomainError::Reconciliation(format!(
            "{} of {} invites were already consumed",
            plan.invite_ids.len() as u64 - claimed,
            plan.invite_ids.len()
        )));
    }

    let mut created = Vec::with_capacity(plan.organization_ids.len());
    for organization_id in &plan.organization_ids {
        let result = sqlx::query(
            r#"INSERT INTO organization_users (user_id, organization_id, role, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT(user_id, organization_id) DO NOTHING"#
        )
        .bind(plan.user_id)
        .bind(organization_id)
        .bind(MembershipRole::Regular.as_str())
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(reconciliation_failed)?;

        if result.rows_affected() == 1 {
            let row: MembershipRow = sqlx::query_as("SELECT * FROM organization_users WHERE id = ?")
                .bind(result.last_insert_rowid())
                .fetch_one(&mut *conn)
                .await
                .map_err(reconciliation_failed)?;
            created.push(Membership::try_from(row)?);
        }
    }

    let result = sqlx::query("UPDATE users SET organization_id = ?, updated_at = ? WHERE id = ?")
        .bind(plan.primary_organization_id)
        .bind(now)
        .bind(plan.user_id)
        .execute(&mut *conn)
        .await
        .map_err(reconciliation_failed)?;
    if result.rows_affected() == 0 {
        return Err(DomainError::UserNotFound(plan.user_id));
    }

    Ok(created)
}

#[derive(sqlx::FromRow)]
struct InviteRow {
    id: i64,
    email: String,
    organization_id: i64,
    active: bool,
    created_at: String,
    updated_at: String,
}

impl TryFrom<InviteRow> for Invite {
    type Error = DomainError;

    fn try_from(row: InviteRow) -> Result<Self, Self::Error> {
        Ok(Invite {
            id: row.id,
            email: row.email,
            organization_id: row.organization_id,
            active: row.active,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}
