//! HTTP API.
//!
//! JSON routes over the services. Errors render as
//! `{"error": "...", "code": "..."}` with the status chosen in [`error`].

pub mod auth;
pub mod error;
pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use sqlx::SqlitePool;

use crate::adapters::github::GitHubGateway;
use crate::adapters::sqlite::{
    SqliteInviteRepository, SqliteMembershipRepository, SqliteOrganizationRepository,
    SqliteUserRepository,
};
use crate::domain::models::ServerConfig;
use crate::domain::ports::Notifier;
use crate::infrastructure::crypto::InstallationCipher;
use crate::services::{
    InviteReconciler, IssueService, OrganizationService, RegistrationService, UserService,
};

pub use auth::{CurrentUser, USER_ID_HEADER};
pub use error::{ApiError, ApiResult, ErrorResponse};

/// Shared state for the HTTP server.
pub struct AppState {
    pub users: UserService,
    pub organizations: OrganizationService,
    pub issues: IssueService,
    pub registration: RegistrationService,
}

impl AppState {
    /// Wire the services over SQLite repositories sharing one pool.
    pub fn new(
        pool: SqlitePool,
        cipher: Arc<InstallationCipher>,
        gateway: Arc<GitHubGateway>,
        notifier: Arc<dyn Notifier>,
        issues_per_page: u32,
    ) -> Self {
        let organizations = Arc::new(SqliteOrganizationRepository::new(pool.clone(), cipher));
        let memberships = Arc::new(SqliteMembershipRepository::new(pool.clone()));
        let invites = Arc::new(SqliteInviteRepository::new(pool.clone()));
        let users = Arc::new(SqliteUserRepository::new(pool));

        Self {
            users: UserService::new(
                users.clone(),
                organizations.clone(),
                memberships.clone(),
                gateway.clone(),
            ),
            organizations: OrganizationService::new(
                organizations.clone(),
                memberships.clone(),
                invites.clone(),
                users.clone(),
                notifier.clone(),
            ),
            issues: IssueService::new(
                organizations.clone(),
                memberships,
                gateway,
                issues_per_page,
            ),
            registration: RegistrationService::new(
                users,
                organizations,
                InviteReconciler::new(invites),
                notifier,
            ),
        }
    }
}

/// Build the router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/register", post(handlers::register))
        .route("/api/organizations", get(handlers::list_organizations))
        .route("/api/organizations/activate", post(handlers::activate_organization))
        .route("/api/organizations/labels", put(handlers::update_labels))
        .route("/api/organizations/add_user", post(handlers::add_user))
        .route("/api/organizations/remove_user", post(handlers::remove_user))
        .route("/api/organizations/change_role", post(handlers::change_role))
        .route("/api/users/organization", post(handlers::select_organization))
        .route("/api/users/repos", get(handlers::list_repositories))
        .route("/api/users/repo", post(handlers::select_repository))
        .route(
            "/api/issues",
            get(handlers::list_issues).post(handlers::create_issue),
        )
        .route(
            "/api/issues/{id}",
            put(handlers::update_issue).delete(handlers::close_issue),
        )
        .route("/health", get(handlers::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// HTTP server for the gateway API.
pub struct HttpServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl HttpServer {
    pub fn new(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Start the server and run until `shutdown` resolves.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let router = build_router(self.state);

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, "issuegate HTTP server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}
