//! GitHub App gateway.
//!
//! [`GitHubGateway::call`] runs one REST call under an installation's
//! credentials. The typed operations below it resolve the organization's
//! installation, check the expected success status and decode the body.

use std::sync::Arc;

use chrono::Duration;
use reqwest::Client;
use tracing::instrument;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{GitHubAppConfig, Organization};
use crate::domain::ports::CredentialMinter;

use super::app_auth::{AppCredentials, GitHubAppMinter};
use super::client::{build_http_client, InstallationClient, ProviderRequest, ProviderResponse};
use super::models::{GitHubIssue, GitHubIssueWrite, GitHubLabel, GitHubRepository, GitHubRepositoryList};
use super::pagination::{last_page, parse_link_header};
use super::token_cache::InstallationTokenCache;

const REPOSITORIES_PER_PAGE: u32 = 100;

/// Result of [`GitHubGateway::call`].
#[derive(Debug)]
pub enum CallOutcome {
    /// No installation is bound and no client was supplied. Nothing was sent.
    NotConfigured,
    Completed(ProviderResponse),
}

/// Parameters of `GET /repos/{owner}/{repo}/issues`.
#[derive(Debug, Clone)]
pub struct IssueQuery {
    pub owner: String,
    pub repo: String,
    pub state: String,
    /// Comma-joined label filter; omitted when `None`.
    pub labels: Option<String>,
    pub per_page: u32,
    pub page: Option<u32>,
}

impl IssueQuery {
    pub fn open(owner: impl Into<String>, repo: impl Into<String>, per_page: u32) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            state: "open".to_string(),
            labels: None,
            per_page,
            page: None,
        }
    }
}

/// One page of issues plus the last page number advertised by GitHub.
#[derive(Debug, Clone)]
pub struct IssuePage {
    pub issues: Vec<GitHubIssue>,
    pub max_page: u32,
}

pub struct GitHubGateway {
    http: Client,
    base_url: String,
    tokens: InstallationTokenCache,
}

impl GitHubGateway {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        minter: Arc<dyn CredentialMinter>,
        refresh_margin: Duration,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens: InstallationTokenCache::new(minter, refresh_margin),
        }
    }

    /// Build the gateway and its App minter from configuration.
    pub fn from_config(
        config: &GitHubAppConfig,
        credentials: Arc<AppCredentials>,
    ) -> DomainResult<Self> {
        let timeout = std::time::Duration::from_secs(config.request_timeout_secs);
        let http = build_http_client(timeout)?;
        let minter = GitHubAppMinter::new(http.clone(), config.api_base_url.clone(), credentials);
        let margin_secs = i64::try_from(config.token_refresh_margin_secs.min(86_400)).unwrap_or(60);
        let margin = Duration::seconds(margin_secs);

        Ok(Self::new(http, config.api_base_url.clone(), Arc::new(minter), margin))
    }

    /// Client authenticated as `installation_id`, using a cached token when fresh.
    pub async fn client_for(&self, installation_id: &str) -> DomainResult<InstallationClient> {
        let token = self.tokens.token(installation_id).await?;
        Ok(InstallationClient::new(self.http.clone(), self.base_url.clone(), token.token))
    }

    /// Client for an organization's installation.
    pub async fn client_for_organization(
        &self,
        organization: &Organization,
    ) -> DomainResult<InstallationClient> {
        match organization.installation() {
            Some(installation_id) => self.client_for(installation_id).await,
            None => Err(DomainError::NotConfigured { organization_id: organization.id }),
        }
    }

    /// Execute one request under an installation's credentials.
    ///
    /// A supplied `client` is used as is. Otherwise a client is obtained
    /// through the token cache, unless no installation id is given, in which
    /// case [`CallOutcome::NotConfigured`] is returned without any I/O.
    /// A 401 drops the cached token for the installation either way.
    pub async fn call(
        &self,
        installation_id: Option<&str>,
        request: &ProviderRequest,
        client: Option<&InstallationClient>,
    ) -> DomainResult<CallOutcome> {
        let installation_id = installation_id.filter(|id| !id.is_empty());

        let response = match (client, installation_id) {
            (Some(client), _) => client.send(request).await?,
            (None, Some(installation_id)) => self.client_for(installation_id).await?.send(request).await?,
            (None, None) => return Ok(CallOutcome::NotConfigured),
        };

        if response.status == 401 {
            if let Some(installation_id) = installation_id {
                // Revoked or rotated token; the next call mints a new one.
                self.tokens.invalidate(installation_id).await?;
            }
        }
        Ok(CallOutcome::Completed(response))
    }

    async fn completed(
        &self,
        organization: &Organization,
        request: &ProviderRequest,
        client: Option<&InstallationClient>,
        expected: u16,
    ) -> DomainResult<ProviderResponse> {
        match self.call(organization.installation(), request, client).await? {
            CallOutcome::Completed(response) => response.expect_status(expected, request.operation),
            CallOutcome::NotConfigured => {
                Err(DomainError::NotConfigured { organization_id: organization.id })
            }
        }
    }

    #[instrument(skip(self, organization, client), fields(organization_id = organization.id, owner = %query.owner, repo = %query.repo))]
    pub async fn list_issues(
        &self,
        organization: &Organization,
        client: Option<&InstallationClient>,
        query: &IssueQuery,
    ) -> DomainResult<IssuePage> {
        let request = ProviderRequest::get(
            "list_issues",
            format!("/repos/{}/{}/issues", query.owner, query.repo),
        )
        .query("state", &query.state)
        .query_opt("labels", query.labels.as_deref())
        .query("per_page", query.per_page)
        .query_opt("page", query.page);

        let response = self.completed(organization, &request, client, 200).await?;
        let max_page = last_page(response.link.as_deref(), query.page);
        let issues = response.json(request.operation)?;

        Ok(IssuePage { issues, max_page })
    }

    #[instrument(skip(self, organization, client), fields(organization_id = organization.id))]
    pub async fn list_labels(
        &self,
        organization: &Organization,
        client: Option<&InstallationClient>,
        owner: &str,
        repo: &str,
    ) -> DomainResult<Vec<GitHubLabel>> {
        let request = ProviderRequest::get("list_labels", format!("/repos/{owner}/{repo}/labels"))
            .query("per_page", 100);

        self.completed(organization, &request, client, 200)
            .await?
            .json(request.operation)
    }

    #[instrument(skip(self, organization, client, payload), fields(organization_id = organization.id))]
    pub async fn create_issue(
        &self,
        organization: &Organization,
        client: Option<&InstallationClient>,
        owner: &str,
        repo: &str,
        payload: &GitHubIssueWrite,
    ) -> DomainResult<GitHubIssue> {
        let request = ProviderRequest::post("create_issue", format!("/repos/{owner}/{repo}/issues"))
            .json(payload)?;

        self.completed(organization, &request, client, 201)
            .await?
            .json(request.operation)
    }

    #[instrument(skip(self, organization, client, payload), fields(organization_id = organization.id))]
    pub async fn update_issue(
        &self,
        organization: &Organization,
        client: Option<&InstallationClient>,
        owner: &str,
        repo: &str,
        number: u64,
        payload: &GitHubIssueWrite,
    ) -> DomainResult<GitHubIssue> {
        let request = ProviderRequest::patch(
            "update_issue",
            format!("/repos/{owner}/{repo}/issues/{number}"),
        )
        .json(payload)?;

        self.completed(organization, &request, client, 200)
            .await?
            .json(request.operation)
    }

    #[instrument(skip(self, organization, client), fields(organization_id = organization.id))]
    pub async fn close_issue(
        &self,
        organization: &Organization,
        client: Option<&InstallationClient>,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> DomainResult<GitHubIssue> {
        let request = ProviderRequest::patch(
            "close_issue",
            format!("/repos/{owner}/{repo}/issues/{number}"),
        )
        .json(&GitHubIssueWrite::close())?;

        self.completed(organization, &request, client, 200)
            .await?
            .json(request.operation)
    }

    /// Every repository the installation can see, following `next` links.
    #[instrument(skip(self, organization, client), fields(organization_id = organization.id))]
    pub async fn installation_repositories(
        &self,
        organization: &Organization,
        client: Option<&InstallationClient>,
    ) -> DomainResult<Vec<GitHubRepository>> {
        let mut repositories = Vec::new();
        let mut page = 1;

        loop {
            let request = ProviderRequest::get("installation_repositories", "/installation/repositories")
                .query("per_page", REPOSITORIES_PER_PAGE)
                .query("page", page);

            let response = self.completed(organization, &request, client, 200).await?;
            let next = response.link.as_deref().and_then(|h| parse_link_header(h).next_page);
            let list: GitHubRepositoryList = response.json(request.operation)?;
            repositories.extend(list.repositories);

            match next {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        Ok(repositories)
    }
}

impl std::fmt::Debug for GitHubGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubGateway")
            .field("base_url", &self.base_url)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::InstallationToken;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RejectingMinter {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CredentialMinter for RejectingMinter {
        async fn mint(&self, _installation_id: &str) -> DomainResult<InstallationToken> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(DomainError::Credential("mint should not be reached".to_string()))
        }
    }

    fn organization(installation_id: Option<&str>) -> Organization {
        Organization {
            id: 7,
            name: Some("acme".to_string()),
            installation_id: installation_id.map(str::to_string),
            mandatory_labels: vec![],
            added_labels: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn gateway(minter: Arc<RejectingMinter>) -> GitHubGateway {
        // Nothing listens on port 9; a network attempt would surface as Upstream.
        GitHubGateway::new(Client::new(), "http://127.0.0.1:9", minter, Duration::seconds(60))
    }

    #[tokio::test]
    async fn test_call_without_installation_is_not_configured() {
        let minter = Arc::new(RejectingMinter::default());
        let gateway = gateway(minter.clone());
        let request = ProviderRequest::get("list_issues", "/repos/a/b/issues");

        assert!(matches!(
            gateway.call(None, &request, None).await.unwrap(),
            CallOutcome::NotConfigured
        ));
        assert!(matches!(
            gateway.call(Some(""), &request, None).await.unwrap(),
            CallOutcome::NotConfigured
        ));
        assert_eq!(minter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_typed_operation_maps_not_configured() {
        let gateway = gateway(Arc::new(RejectingMinter::default()));

        let err = gateway
            .list_labels(&organization(None), None, "acme", "web")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotConfigured { organization_id: 7 }));

        let err = gateway
            .client_for_organization(&organization(Some("")))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotConfigured { organization_id: 7 }));
    }

    #[tokio::test]
    async fn test_mint_failure_surfaces_as_credential_error() {
        let minter = Arc::new(RejectingMinter::default());
        let gateway = gateway(minter.clone());

        let err = gateway
            .list_labels(&organization(Some("99")), None, "acme", "web")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Credential(_)));
        assert_eq!(minter.calls.load(Ordering::SeqCst), 1);
    }
}
