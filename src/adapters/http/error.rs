//! Mapping of domain errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use crate::domain::errors::DomainError;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// The caller could not be identified.
    Unauthorized(String),
    Domain(DomainError),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        let err = match self {
            Self::Unauthorized(msg) => {
                return (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone());
            }
            Self::Domain(err) => err,
        };

        let (status, code) = match err {
            DomainError::OrganizationNotFound(_)
            | DomainError::UserNotFound(_)
            | DomainError::MembershipNotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            DomainError::NotConfigured { .. } => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "NOT_CONFIGURED",
                    "GitHub App is not installed for this organization".to_string(),
                );
            }
            DomainError::Credential(_) => (StatusCode::BAD_GATEWAY, "CREDENTIAL_ERROR"),
            DomainError::Upstream { .. } => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            DomainError::Reconciliation(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "RECONCILIATION_ERROR")
            }
            DomainError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            DomainError::ValidationFailed(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR")
            }
            DomainError::DatabaseError(_)
            | DomainError::SerializationError(_)
            | DomainError::Encryption(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };
        (status, code, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, error) = self.parts();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), code, error = %error, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), code, error = %error, "Request rejected");
        }
        (
            status,
            Json(ErrorResponse {
                error,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: DomainError) -> StatusCode {
        ApiError::from(err).parts().0
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(DomainError::UserNotFound(1)), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(DomainError::Credential("rejected".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(DomainError::upstream_status("create_issue", 422, "bad")),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(DomainError::Forbidden("no".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(DomainError::ValidationFailed("no".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(DomainError::Reconciliation("no".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_configured_message() {
        let (status, code, message) =
            ApiError::from(DomainError::NotConfigured { organization_id: 3 }).parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "NOT_CONFIGURED");
        assert_eq!(message, "GitHub App is not installed for this organization");
    }
}
