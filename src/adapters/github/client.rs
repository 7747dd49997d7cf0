//! Installation-scoped HTTP client for the GitHub REST API v3.
//!
//! An [`InstallationClient`] is a bearer token bound to a shared
//! `reqwest::Client`. It executes one [`ProviderRequest`] at a time and hands
//! back a [`ProviderResponse`] regardless of status; typed operations decide
//! which status counts as success.

use std::time::Duration;

use reqwest::header::LINK;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::domain::errors::{DomainError, DomainResult};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const GITHUB_ACCEPT: &str = "application/vnd.github+json";
pub const GITHUB_API_VERSION: &str = "2022-11-28";
pub const USER_AGENT: &str = concat!("issuegate/", env!("CARGO_PKG_VERSION"));

/// Build the shared HTTP client used for every GitHub call.
pub fn build_http_client(timeout: Duration) -> DomainResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| DomainError::upstream_transport("client_setup", e.to_string()))
}

/// Attach the headers GitHub expects on every REST call.
pub(crate) fn github_request(
    http: &Client,
    method: Method,
    url: &str,
    bearer: &str,
) -> reqwest::RequestBuilder {
    http.request(method, url)
        .header("Authorization", format!("Bearer {bearer}"))
        .header("Accept", GITHUB_ACCEPT)
        .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
        .header("User-Agent", USER_AGENT)
}

/// One REST call against the provider, relative to the API base URL.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    /// Name used in logs and error messages (e.g. `list_issues`).
    pub operation: &'static str,
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ProviderRequest {
    pub fn new(operation: &'static str, method: Method, path: impl Into<String>) -> Self {
        Self {
            operation,
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(operation: &'static str, path: impl Into<String>) -> Self {
        Self::new(operation, Method::GET, path)
    }

    pub fn post(operation: &'static str, path: impl Into<String>) -> Self {
        Self::new(operation, Method::POST, path)
    }

    pub fn patch(operation: &'static str, path: impl Into<String>) -> Self {
        Self::new(operation, Method::PATCH, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Add a query parameter only when a value is present.
    pub fn query_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> DomainResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

/// A provider response with its status, `Link` header and JSON body.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub status: u16,
    pub link: Option<String>,
    pub body: Value,
}

impl ProviderResponse {
    /// Fail with [`DomainError::Upstream`] unless the status is `expected`.
    pub fn expect_status(self, expected: u16, operation: &str) -> DomainResult<Self> {
        if self.status == expected {
            return Ok(self);
        }
        Err(DomainError::upstream_status(operation, self.status, self.error_message()))
    }

    /// Deserialize the body into a typed model.
    pub fn json<T: DeserializeOwned>(self, operation: &str) -> DomainResult<T> {
        serde_json::from_value(self.body).map_err(|e| {
            DomainError::upstream_transport(operation, format!("unexpected response body: {e}"))
        })
    }

    /// GitHub error bodies carry a `message` field; fall back to the raw body.
    fn error_message(&self) -> String {
        match &self.body {
            Value::Object(map) => map
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| self.body.to_string()),
            Value::String(text) => text.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// HTTP client authenticated as one GitHub App installation.
#[derive(Clone)]
pub struct InstallationClient {
    http: Client,
    base_url: String,
    token: String,
}

impl InstallationClient {
    pub fn new(http: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute a request. Only transport failures are errors here.
    pub async fn send(&self, request: &ProviderRequest) -> DomainResult<ProviderResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = github_request(&self.http, request.method.clone(), &url, &self.token);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(|e| {
            DomainError::upstream_transport(request.operation, format!("request failed: {e}"))
        })?;

        let status = resp.status().as_u16();
        let link = resp
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = resp.text().await.map_err(|e| {
            DomainError::upstream_transport(request.operation, format!("reading body failed: {e}"))
        })?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        tracing::debug!(
            operation = request.operation,
            method = %request.method,
            path = %request.path,
            status,
            "GitHub call completed"
        );

        Ok(ProviderResponse { status, link, body })
    }
}

impl std::fmt::Debug for InstallationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallationClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}
