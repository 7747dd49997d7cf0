//! GitHub REST API response and request models.
//!
//! These structs map to the GitHub REST API v3 JSON payloads. Only the
//! fields the gateway reads or returns are declared; everything else in a
//! provider response is ignored during deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A GitHub account (user or organization).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubAccount {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// An issue returned by the GitHub API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubIssue {
    /// Unique numeric identifier for the issue.
    pub id: u64,
    /// Sequential number within the repository (e.g., 42 → "#42").
    pub number: u64,
    /// Issue title.
    pub title: String,
    /// Issue body text (may be absent or null).
    #[serde(default)]
    pub body: Option<String>,
    /// Current state: "open" or "closed".
    pub state: String,
    /// Labels applied to the issue.
    #[serde(default)]
    pub labels: Vec<GitHubLabel>,
    /// Users assigned to the issue.
    #[serde(default)]
    pub assignees: Vec<GitHubAccount>,
    /// Author of the issue.
    #[serde(default)]
    pub user: Option<GitHubAccount>,
    /// Number of comments.
    #[serde(default)]
    pub comments: u64,
    /// URL to view the issue in the GitHub UI.
    pub html_url: String,
    /// Timestamp of creation.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update.
    pub updated_at: DateTime<Utc>,
}

/// A label defined on a repository or applied to an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubLabel {
    /// The label name (e.g., "bug", "priority: high").
    pub name: String,
    /// Hex colour without the leading `#`.
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A repository accessible to an installation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: GitHubAccount,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Response of `GET /installation/repositories`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepositoryList {
    pub total_count: u64,
    pub repositories: Vec<GitHubRepository>,
}

/// Request body for creating or updating an issue.
///
/// Absent fields are omitted from the JSON so a PATCH only touches what the
/// caller supplied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubIssueWrite {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    /// New state: "open" or "closed".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl GitHubIssueWrite {
    /// Payload that closes an issue and changes nothing else.
    pub fn close() -> Self {
        Self {
            state: Some("closed".to_string()),
            ..Self::default()
        }
    }
}
