//! Membership repository port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Membership, MembershipRole, NewMembership};

/// Repository interface for Membership persistence.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Create a membership, or return the existing one for the same
    /// (user, organization) pair untouched. The flag is true when a row was
    /// inserted.
    async fn create(&self, membership: &NewMembership) -> DomainResult<(Membership, bool)>;

    /// Get a membership by ID.
    async fn get(&self, id: i64) -> DomainResult<Option<Membership>>;

    /// Find the membership of a user in an organization.
    async fn find_by_user_and_org(
        &self,
        user_id: i64,
        organization_id: i64,
    ) -> DomainResult<Option<Membership>>;

    /// Change the role of an existing membership.
    async fn update_role(
        &self,
        user_id: i64,
        organization_id: i64,
        role: MembershipRole,
    ) -> DomainResult<Membership>;

    /// Delete the membership of a user in an organization.
    async fn delete(&self, user_id: i64, organization_id: i64) -> DomainResult<()>;
}
