//! Issue service: organization-scoped issue listing and writes.
//!
//! Every call resolves the caller's primary organization, checks
//! membership, applies the label policy and goes through the gateway under
//! that organization's installation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::adapters::github::{GitHubGateway, GitHubIssue, GitHubIssueWrite, GitHubLabel, IssueQuery};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{normalize_labels, Organization, User};
use crate::domain::ports::{MembershipRepository, OrganizationRepository};

use super::access::{primary_organization_id, require_member};
use super::label_policy::{effective_filter, effective_payload_labels};

/// Filters for an issue listing.
#[derive(Debug, Clone, Default)]
pub struct IssueListRequest {
    pub labels: Vec<String>,
    pub page: Option<u32>,
}

/// Issue fields a caller may set on create or update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueDraft {
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub assignees: Option<Vec<String>>,
    #[serde(default)]
    pub milestone: Option<u64>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrganizationRef {
    pub id: i64,
    pub name: Option<String>,
}

impl From<&Organization> for OrganizationRef {
    fn from(organization: &Organization) -> Self {
        Self {
            id: organization.id,
            name: organization.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssueListing {
    pub issues: Vec<GitHubIssue>,
    pub max_page: u32,
    pub labels: Vec<GitHubLabel>,
    pub organization: OrganizationRef,
    pub repo: RepositoryRef,
}

/// Organization and repository an issue call is addressed to.
struct IssueScope {
    organization: Organization,
    owner: String,
    repo: String,
}

pub struct IssueService {
    organizations: Arc<dyn OrganizationRepository>,
    memberships: Arc<dyn MembershipRepository>,
    gateway: Arc<GitHubGateway>,
    per_page: u32,
}

impl IssueService {
    pub fn new(
        organizations: Arc<dyn OrganizationRepository>,
        memberships: Arc<dyn MembershipRepository>,
        gateway: Arc<GitHubGateway>,
        per_page: u32,
    ) -> Self {
        Self {
            organizations,
            memberships,
            gateway,
            per_page,
        }
    }

    async fn scope(&self, user: &User) -> DomainResult<IssueScope> {
        let organization_id = primary_organization_id(user)?;
        let (organization, _) =
            require_member(&*self.organizations, &*self.memberships, user, organization_id).await?;

        let (owner, repo) = user.repository().ok_or_else(|| {
            DomainError::ValidationFailed("no repository selected for this user".to_string())
        })?;

        Ok(IssueScope {
            owner: owner.to_string(),
            repo: repo.to_string(),
            organization,
        })
    }

    /// One page of open issues narrowed by the organization's mandatory
    /// labels, plus the repository's labels.
    #[instrument(skip(self, user, request), fields(user_id = user.id, page = request.page))]
    pub async fn list(&self, user: &User, request: IssueListRequest) -> DomainResult<IssueListing> {
        let scope = self.scope(user).await?;
        let requested = normalize_labels(&request.labels)?;

        // One token for both calls.
        let client = self.gateway.client_for_organization(&scope.organization).await?;

        let mut query = IssueQuery::open(scope.owner.clone(), scope.repo.clone(), self.per_page);
        query.labels = effective_filter(&scope.organization.mandatory_labels, &requested);
        query.page = request.page;

        let page = self
            .gateway
            .list_issues(&scope.organization, Some(&client), &query)
            .await?;
        let labels = self
            .gateway
            .list_labels(&scope.organization, Some(&client), &scope.owner, &scope.repo)
            .await?;

        Ok(IssueListing {
            issues: page.issues,
            max_page: page.max_page,
            labels,
            organization: OrganizationRef::from(&scope.organization),
            repo: RepositoryRef {
                owner: scope.owner,
                name: scope.repo,
            },
        })
    }

    #[instrument(skip(self, user, draft), fields(user_id = user.id))]
    pub async fn create(&self, user: &User, draft: IssueDraft) -> DomainResult<GitHubIssue> {
        let scope = self.scope(user).await?;
        let payload = Self::payload(&scope.organization, draft)?;

        let issue = self
            .gateway
            .create_issue(&scope.organization, None, &scope.owner, &scope.repo, &payload)
            .await?;
        tracing::info!(number = issue.number, "Issue created");
        Ok(issue)
    }

    #[instrument(skip(self, user, draft), fields(user_id = user.id))]
    pub async fn update(&self, user: &User, number: u64, draft: IssueDraft) -> DomainResult<GitHubIssue> {
        let scope = self.scope(user).await?;
        let payload = Self::payload(&scope.organization, draft)?;

        self.gateway
            .update_issue(&scope.organization, None, &scope.owner, &scope.repo, number, &payload)
            .await
    }

    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn close(&self, user: &User, number: u64) -> DomainResult<GitHubIssue> {
        let scope = self.scope(user).await?;
        self.gateway
            .close_issue(&scope.organization, None, &scope.owner, &scope.repo, number)
            .await
    }

    fn payload(organization: &Organization, draft: IssueDraft) -> DomainResult<GitHubIssueWrite> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(DomainError::ValidationFailed("title cannot be empty".to_string()));
        }

        let requested = draft.labels.as_deref().map(normalize_labels).transpose()?;
        let labels = effective_payload_labels(requested.as_deref(), &organization.added_labels);

        Ok(GitHubIssueWrite {
            title: Some(title.to_string()),
            body: draft.body,
            assignees: draft.assignees,
            milestone: draft.milestone,
            labels: Some(labels),
            state: None,
        })
    }
}
