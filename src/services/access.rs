//! Organization access checks shared by the services.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Membership, Organization, User};
use crate::domain::ports::{MembershipRepository, OrganizationRepository};

/// The caller's primary organization id.
pub fn primary_organization_id(user: &User) -> DomainResult<i64> {
    user.organization_id.ok_or_else(|| {
        DomainError::ValidationFailed("no organization selected for this user".to_string())
    })
}

/// Load an organization the user belongs to.
pub async fn require_member(
    organizations: &dyn OrganizationRepository,
    memberships: &dyn MembershipRepository,
    user: &User,
    organization_id: i64,
) -> DomainResult<(Organization, Membership)> {
    let organization = organizations
        .get(organization_id)
        .await?
        .ok_or(DomainError::OrganizationNotFound(organization_id))?;

    let membership = memberships
        .find_by_user_and_org(user.id, organization_id)
        .await?
        .ok_or_else(|| {
            DomainError::Forbidden(format!("not a member of organization {organization_id}"))
        })?;

    Ok((organization, membership))
}

/// Load an organization the user administers.
pub async fn require_admin(
    organizations: &dyn OrganizationRepository,
    memberships: &dyn MembershipRepository,
    user: &User,
    organization_id: i64,
) -> DomainResult<Organization> {
    let (organization, membership) =
        require_member(organizations, memberships, user, organization_id).await?;
    if !membership.is_admin() {
        return Err(DomainError::Forbidden(format!(
            "admin role required in organization {organization_id}"
        )));
    }
    Ok(organization)
}
