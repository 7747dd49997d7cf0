//! Credential minter port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::InstallationToken;

/// Exchanges an installation identifier for a short-lived access token.
///
/// Implementations fail with [`DomainError::Credential`] when the provider
/// rejects the exchange; they never panic on provider errors.
///
/// [`DomainError::Credential`]: crate::domain::errors::DomainError::Credential
#[async_trait]
pub trait CredentialMinter: Send + Sync {
    async fn mint(&self, installation_id: &str) -> DomainResult<InstallationToken>;
}
