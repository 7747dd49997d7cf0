//! User workspace: which organization and repository issue calls address.

use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use crate::adapters::github::{GitHubGateway, GitHubRepository};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{User, WorkspaceSelection};
use crate::domain::ports::{MembershipRepository, OrganizationRepository, UserRepository};

use super::access::{primary_organization_id, require_member};

/// Name-only view of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositorySummary {
    pub name: String,
    pub full_name: String,
}

impl From<GitHubRepository> for RepositorySummary {
    fn from(repo: GitHubRepository) -> Self {
        Self {
            name: repo.name,
            full_name: repo.full_name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RepositoryListing {
    Full(Vec<GitHubRepository>),
    Summary(Vec<RepositorySummary>),
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
    organizations: Arc<dyn OrganizationRepository>,
    memberships: Arc<dyn MembershipRepository>,
    gateway: Arc<GitHubGateway>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        organizations: Arc<dyn OrganizationRepository>,
        memberships: Arc<dyn MembershipRepository>,
        gateway: Arc<GitHubGateway>,
    ) -> Self {
        Self {
            users,
            organizations,
            memberships,
            gateway,
        }
    }

    /// Look up the caller by id.
    pub async fn get(&self, user_id: i64) -> DomainResult<User> {
        self.users
            .get(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))
    }

    /// Switch the primary organization and default to its first repository.
    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn select_organization(&self, user: &User, organization_id: i64) -> DomainResult<User> {
        let (organization, _) =
            require_member(&*self.organizations, &*self.memberships, user, organization_id).await?;

        let repositories = self
            .gateway
            .installation_repositories(&organization, None)
            .await?;
        let first = repositories.into_iter().next().ok_or_else(|| {
            DomainError::upstream_transport(
                "installation_repositories",
                "the installation grants access to no repositories",
            )
        })?;

        self.users
            .update_workspace(
                user.id,
                &WorkspaceSelection {
                    organization_id: Some(organization_id),
                    default_organization: Some(first.owner.login),
                    default_repo: Some(first.name),
                },
            )
            .await
    }

    /// Repositories of the caller's primary organization.
    pub async fn repositories(&self, user: &User, full: bool) -> DomainResult<RepositoryListing> {
        let repositories = self.primary_repositories(user).await?;
        Ok(if full {
            RepositoryListing::Full(repositories)
        } else {
            RepositoryListing::Summary(repositories.into_iter().map(Into::into).collect())
        })
    }

    /// Make `repo` (a name or `owner/name`) the default repository.
    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn select_repository(&self, user: &User, repo: &str) -> DomainResult<User> {
        let repo = repo.trim();
        let selected = self
            .primary_repositories(user)
            .await?
            .into_iter()
            .find(|r| r.name == repo || r.full_name == repo)
            .ok_or_else(|| {
                DomainError::ValidationFailed(format!(
                    "repository '{repo}' is not accessible to this organization"
                ))
            })?;

        self.users
            .update_workspace(
                user.id,
                &WorkspaceSelection {
                    organization_id: None,
                    default_organization: Some(selected.owner.login),
                    default_repo: Some(selected.name),
                },
            )
            .await
    }

    async fn primary_repositories(&self, user: &User) -> DomainResult<Vec<GitHubRepository>> {
        let organization_id = primary_organization_id(user)?;
        let (organization, _) =
            require_member(&*self.organizations, &*self.memberships, user, organization_id).await?;
        self.gateway.installation_repositories(&organization, None).await
    }
}
