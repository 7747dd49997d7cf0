//! Notification port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::Organization;

/// Sends membership notifications to users.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Tell an unregistered email it was invited to join an organization.
    async fn send_invite_email(&self, email: &str, organization: &Organization) -> DomainResult<()>;

    /// Tell a user they were added to an organization.
    async fn send_added_email(&self, email: &str, organization: &Organization) -> DomainResult<()>;
}
