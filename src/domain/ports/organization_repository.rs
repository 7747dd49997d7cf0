//! Organization repository port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::Organization;

/// Result of a find-or-create by installation identifier.
#[derive(Debug, Clone)]
pub struct ActivatedOrganization {
    pub organization: Organization,
    /// False when the installation was already bound to this organization
    pub created: bool,
}

/// Repository interface for Organization persistence.
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Get an organization by ID.
    async fn get(&self, id: i64) -> DomainResult<Option<Organization>>;

    /// Return the organization bound to `installation_id`, creating it if
    /// none exists. Never creates a second organization for the same
    /// installation.
    async fn find_or_create_by_installation(
        &self,
        installation_id: &str,
        name: Option<&str>,
    ) -> DomainResult<ActivatedOrganization>;

    /// Replace the label policy. `None` keeps the stored list.
    async fn update_labels(
        &self,
        id: i64,
        mandatory_labels: Option<&[String]>,
        added_labels: Option<&[String]>,
    ) -> DomainResult<Organization>;

    /// Organizations the user is a member of, ordered by ID.
    async fn list_for_user(&self, user_id: i64) -> DomainResult<Vec<Organization>>;
}
