//! User domain model.
//!
//! Only the fields the gateway reads or writes are modelled: the identity
//! used for invite matching and the workspace selection (primary
//! organization plus GitHub owner/repo) that addresses every issue call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Primary organization
    pub organization_id: Option<i64>,
    /// GitHub owner login of the selected repository
    pub default_organization: Option<String>,
    /// Selected repository name
    pub default_repo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The selected `(owner, repo)` pair, if both halves are set.
    pub fn repository(&self) -> Option<(&str, &str)> {
        match (self.default_organization.as_deref(), self.default_repo.as_deref()) {
            (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => {
                Some((owner, repo))
            }
            _ => None,
        }
    }
}

/// A user that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

/// Workspace fields updated together when a user selects an organization
/// or repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceSelection {
    pub organization_id: Option<i64>,
    pub default_organization: Option<String>,
    pub default_repo: Option<String>,
}
