//! Organization membership domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a user within an organization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipRole {
    /// Can read and write issues
    #[default]
    Regular,
    /// Can additionally manage members and label policy
    Admin,
}

impl MembershipRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Admin => "admin",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "regular" => Some(Self::Regular),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// A user's membership in an organization.
///
/// There is at most one membership per (user, organization) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub id: i64,
    pub user_id: i64,
    pub organization_id: i64,
    pub role: MembershipRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    pub fn is_admin(&self) -> bool {
        self.role == MembershipRole::Admin
    }
}

/// A membership that has not been persisted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewMembership {
    pub user_id: i64,
    pub organization_id: i64,
    pub role: MembershipRole,
}
