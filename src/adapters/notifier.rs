//! Notifier that records membership notifications in the log.
//!
//! Mail delivery is owned by the hosting platform; this adapter emits one
//! structured event per notification for it to pick up.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::Organization;
use crate::domain::ports::Notifier;

#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for TracingNotifier {
    async fn send_invite_email(&self, email: &str, organization: &Organization) -> DomainResult<()> {
        tracing::info!(
            target: "issuegate::notifications",
            kind = "invite",
            email,
            organization_id = organization.id,
            organization_name = organization.name.as_deref().unwrap_or_default(),
            "Invitation sent"
        );
        Ok(())
    }

    async fn send_added_email(&self, email: &str, organization: &Organization) -> DomainResult<()> {
        tracing::info!(
            target: "issuegate::notifications",
            kind = "added",
            email,
            organization_id = organization.id,
            organization_name = organization.name.as_deref().unwrap_or_default(),
            "Membership notification sent"
        );
        Ok(())
    }
}
