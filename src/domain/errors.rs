//! Domain errors for the issuegate gateway.

use thiserror::Error;

/// Domain-level errors that can occur while serving a tenant request.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Organization not found: {0}")]
    OrganizationNotFound(i64),

    #[error("User not found: {0}")]
    UserNotFound(i64),

    #[error("Membership not found for user {user_id} in organization {organization_id}")]
    MembershipNotFound { user_id: i64, organization_id: i64 },

    #[error("GitHub App is not installed for organization {organization_id}")]
    NotConfigured { organization_id: i64 },

    #[error("Installation credential exchange failed: {0}")]
    Credential(String),

    #[error("GitHub {operation} failed{}: {message}", format_status(.status))]
    Upstream {
        operation: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Invite reconciliation failed: {0}")]
    Reconciliation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Encryption error: {0}")]
    Encryption(String),
}

fn format_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" with status {s}")).unwrap_or_default()
}

impl DomainError {
    /// Build an upstream error for a provider response that was not the
    /// expected success status.
    pub fn upstream_status(operation: &str, status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            operation: operation.to_string(),
            status: Some(status),
            message: message.into(),
        }
    }

    /// Build an upstream error for a call that never produced a response.
    pub fn upstream_transport(operation: &str, message: impl Into<String>) -> Self {
        Self::Upstream {
            operation: operation.to_string(),
            status: None,
            message: message.into(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
