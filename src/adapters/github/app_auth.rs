//! GitHub App authentication.
//!
//! The App signs a short-lived RS256 JWT with its private key and trades it
//! for an installation access token via
//! `POST /app/installations/{id}/access_tokens`.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{GitHubAppConfig, InstallationToken};
use crate::domain::ports::CredentialMinter;
use crate::infrastructure::config::ConfigError;

use super::client::github_request;

/// GitHub rejects App JWTs that live longer than ten minutes.
const JWT_LIFETIME_MINUTES: i64 = 9;
/// Backdated to tolerate clock drift between us and GitHub.
const JWT_BACKDATE_SECS: i64 = 60;

#[derive(Debug, Serialize, Deserialize)]
struct AppClaims {
    iat: i64,
    exp: i64,
    iss: String,
}

#[derive(Deserialize)]
struct AccessTokenResponse {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Immutable App identity loaded once at startup.
pub struct AppCredentials {
    app_id: String,
    encoding_key: EncodingKey,
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl AppCredentials {
    /// Parse a PEM-encoded RSA private key.
    pub fn from_pem(app_id: impl Into<String>, pem: &[u8]) -> Result<Self, ConfigError> {
        let app_id = app_id.into();
        if app_id.trim().is_empty() {
            return Err(ConfigError::MissingAppId);
        }
        let encoding_key = EncodingKey::from_rsa_pem(pem)
            .map_err(|e| ConfigError::InvalidPrivateKey(e.to_string()))?;

        Ok(Self {
            app_id,
            encoding_key,
            client_id: None,
            client_secret: None,
        })
    }

    /// Read the key file named by the configuration.
    pub fn from_config(config: &GitHubAppConfig) -> Result<Self, ConfigError> {
        let path = config
            .private_key_path
            .as_ref()
            .ok_or(ConfigError::MissingPrivateKey)?;
        let pem = std::fs::read(path).map_err(|e| ConfigError::UnreadablePrivateKey {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut credentials = Self::from_pem(config.app_id.clone(), &pem)?;
        credentials.client_id = config.client_id.clone();
        credentials.client_secret = config.client_secret.clone();
        Ok(credentials)
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Whether OAuth client credentials were supplied alongside the key.
    pub fn has_oauth_client(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }

    /// Sign an App JWT valid from `now - 60s` to `now + 9min`.
    pub fn app_jwt(&self, now: DateTime<Utc>) -> DomainResult<String> {
        let claims = AppClaims {
            iat: (now - Duration::seconds(JWT_BACKDATE_SECS)).timestamp(),
            exp: (now + Duration::minutes(JWT_LIFETIME_MINUTES)).timestamp(),
            iss: self.app_id.clone(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| DomainError::Credential(format!("failed to sign App JWT: {e}")))
    }
}

impl fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCredentials")
            .field("app_id", &self.app_id)
            .field("client_id", &self.client_id)
            .field("private_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Mints installation tokens against the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubAppMinter {
    http: Client,
    base_url: String,
    credentials: Arc<AppCredentials>,
}

impl GitHubAppMinter {
    pub fn new(http: Client, base_url: impl Into<String>, credentials: Arc<AppCredentials>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }
}

#[async_trait]
impl CredentialMinter for GitHubAppMinter {
    async fn mint(&self, installation_id: &str) -> DomainResult<InstallationToken> {
        if installation_id.is_empty() {
            return Err(DomainError::Credential("installation id is empty".to_string()));
        }
        if !installation_id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::Credential("installation id is not numeric".to_string()));
        }

        let jwt = self.credentials.app_jwt(Utc::now())?;
        let url = format!(
            "{}/app/installations/{}/access_tokens",
            self.base_url, installation_id
        );

        let resp = github_request(&self.http, Method::POST, &url, &jwt)
            .send()
            .await
            .map_err(|e| DomainError::Credential(format!("token exchange request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "GitHub rejected installation token exchange");
            return Err(DomainError::Credential(format!(
                "token exchange returned {status}: {body}"
            )));
        }

        let token: AccessTokenResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::Credential(format!("token exchange parse failed: {e}")))?;

        tracing::debug!(expires_at = %token.expires_at, "Minted installation token");

        Ok(InstallationToken {
            token: token.token,
            expires_at: token.expires_at,
        })
    }
}
