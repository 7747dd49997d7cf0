//! Common test utilities for integration tests
//!
//! Builds the gateway against a wiremock GitHub, an in-memory database and
//! a notifier that records what it was asked to send.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use issuegate::adapters::github::{AppCredentials, GitHubGateway};
use issuegate::adapters::http::{build_router, AppState, USER_ID_HEADER};
use issuegate::adapters::sqlite::create_migrated_test_pool;
use issuegate::domain::models::{GitHubAppConfig, Organization};
use issuegate::domain::ports::Notifier;
use issuegate::infrastructure::crypto::InstallationCipher;
use issuegate::DomainResult;

pub const APP_ID: &str = "12345";
pub const INSTALLATION_TOKEN: &str = "ghs_integration_token";

const PRIVATE_KEY: &[u8] = include_bytes!("../fixtures/github-app-key.pem");

/// A notification the gateway asked to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub kind: &'static str,
    pub email: String,
    pub organization_id: i64,
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentNotification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, kind: &'static str, email: &str, organization: &Organization) {
        self.sent.lock().unwrap().push(SentNotification {
            kind,
            email: email.to_string(),
            organization_id: organization.id,
        });
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_invite_email(&self, email: &str, organization: &Organization) -> DomainResult<()> {
        self.record("invite", email, organization);
        Ok(())
    }

    async fn send_added_email(&self, email: &str, organization: &Organization) -> DomainResult<()> {
        self.record("added", email, organization);
        Ok(())
    }
}

pub fn cipher() -> Arc<InstallationCipher> {
    Arc::new(InstallationCipher::new("integration-test-app-key"))
}

/// Gateway whose App minter and REST calls both go to `server`.
pub fn gateway(server: &MockServer) -> Arc<GitHubGateway> {
    let credentials = AppCredentials::from_pem(APP_ID, PRIVATE_KEY).unwrap();
    let config = GitHubAppConfig {
        api_base_url: server.uri(),
        app_id: APP_ID.to_string(),
        ..Default::default()
    };
    Arc::new(GitHubGateway::from_config(&config, Arc::new(credentials)).unwrap())
}

/// Answer token exchanges for `installation_id`, expecting exactly `mints`.
pub async fn mount_token_exchange(server: &MockServer, installation_id: &str, mints: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/app/installations/{installation_id}/access_tokens")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "token": INSTALLATION_TOKEN,
            "expires_at": (Utc::now() + Duration::hours(1)).to_rfc3339(),
        })))
        .expect(mints)
        .mount(server)
        .await;
}

pub fn organization(id: i64, installation_id: Option<&str>) -> Organization {
    Organization {
        id,
        name: Some("Acme".to_string()),
        installation_id: installation_id.map(str::to_string),
        mandatory_labels: vec![],
        added_labels: vec![],
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn issue_json(number: u64, title: &str) -> Value {
    json!({
        "id": 1000 + number,
        "number": number,
        "title": title,
        "body": null,
        "state": "open",
        "labels": [{ "name": "triage", "color": "ededed" }],
        "assignees": [],
        "user": { "id": 1, "login": "octocat" },
        "comments": 0,
        "html_url": format!("https://github.com/acme/web/issues/{number}"),
        "created_at": "2024-05-01T10:00:00Z",
        "updated_at": "2024-05-01T10:00:00Z",
    })
}

pub fn repositories_json() -> Value {
    json!({
        "total_count": 2,
        "repositories": [
            {
                "id": 1,
                "name": "web",
                "full_name": "acme/web",
                "owner": { "id": 9, "login": "acme" },
                "private": true,
            },
            {
                "id": 2,
                "name": "api",
                "full_name": "acme/api",
                "owner": { "id": 9, "login": "acme" },
                "private": false,
            },
        ],
    })
}

/// The full HTTP stack over an in-memory database.
pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    pub async fn new(server: &MockServer) -> Self {
        let pool = create_migrated_test_pool().await.unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let state = AppState::new(pool.clone(), cipher(), gateway(server), notifier.clone(), 6);

        Self {
            router: build_router(Arc::new(state)),
            pool,
            notifier,
        }
    }

    /// Send one request; `user_id` becomes the identity header.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        user_id: Option<i64>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = user_id {
            builder = builder.header(USER_ID_HEADER, user_id.to_string());
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    /// Register a user and return its id.
    pub async fn register(&self, name: &str, email: &str) -> i64 {
        let (status, body) = self
            .request(
                "POST",
                "/api/register",
                None,
                Some(json!({ "name": name, "email": email })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        body["user"]["id"].as_i64().unwrap()
    }

    /// Activate an installation on behalf of `user_id`; returns the org id.
    pub async fn activate(&self, user_id: i64, installation_id: &str) -> i64 {
        let (status, body) = self
            .request(
                "POST",
                "/api/organizations/activate",
                Some(user_id),
                Some(json!({ "installation_id": installation_id, "name": "Acme" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "activate failed: {body}");
        body["organization"]["id"].as_i64().unwrap()
    }
}
