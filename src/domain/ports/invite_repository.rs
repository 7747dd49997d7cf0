//! Invite repository port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Invite, Membership, NewUser, Reconciliation, ReconciliationPlan, User};

/// Repository interface for Invite persistence.
#[async_trait]
pub trait InviteRepository: Send + Sync {
    /// Record an active invite, or return the active invite already pending
    /// for the same email and organization.
    async fn create(&self, email: &str, organization_id: i64) -> DomainResult<Invite>;

    /// Active invites for an email, earliest created first (ties by ID).
    async fn find_active_by_email(&self, email: &str) -> DomainResult<Vec<Invite>>;

    /// Active invites of an organization.
    async fn list_active_for_organization(&self, organization_id: i64) -> DomainResult<Vec<Invite>>;

    /// Apply a reconciliation in a single transaction: create the
    /// memberships, deactivate the invites and set the user's primary
    /// organization. Returns the memberships that were inserted. Nothing is
    /// visible if any step fails.
    async fn apply_reconciliation(&self, plan: &ReconciliationPlan) -> DomainResult<Vec<Membership>>;

    /// Insert a user and reconcile the active invites addressed to its
    /// email in the same transaction. A duplicate email is a validation
    /// error. On any failure neither the user nor the memberships exist.
    async fn create_user_with_invites(&self, user: &NewUser) -> DomainResult<(User, Reconciliation)>;
}
