//! Caller identity.
//!
//! Authentication happens upstream; the authenticating proxy forwards the
//! user id in the `x-user-id` header.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::errors::DomainError;
use crate::domain::models::User;

use super::error::ApiError;
use super::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller, loaded fresh for every request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
            .ok_or_else(|| ApiError::Unauthorized(format!("missing or invalid {USER_ID_HEADER} header")))?;

        match state.users.get(user_id).await {
            Ok(user) => Ok(Self(user)),
            Err(DomainError::UserNotFound(_)) => {
                Err(ApiError::Unauthorized("unknown user".to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}
