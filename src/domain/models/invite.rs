//! Organization invite domain model.
//!
//! An invite is a pending, email-addressed promise of membership. It moves
//! from pending (`active = true`) to consumed (`active = false`) exactly
//! once, when a user registers with the invited email.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::membership::Membership;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    pub id: i64,
    pub email: String,
    pub organization_id: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invite {
    /// Whether the invite is still waiting to be consumed.
    pub fn is_pending(&self) -> bool {
        self.active
    }
}

/// Normalize an email address for invite matching.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Work computed by the reconciler and applied atomically by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationPlan {
    /// User receiving the memberships
    pub user_id: i64,
    /// Invites to consume
    pub invite_ids: Vec<i64>,
    /// Organizations to join, in invite order, without duplicates
    pub organization_ids: Vec<i64>,
    /// New primary organization for the user
    pub primary_organization_id: i64,
}

impl ReconciliationPlan {
    /// Plan for `user_id` from its active invites, earliest first.
    ///
    /// The first invite's organization becomes primary. `None` when there
    /// is nothing to consume.
    pub fn from_invites(user_id: i64, invites: &[Invite]) -> Option<Self> {
        let first = invites.first()?;

        let mut organization_ids = Vec::with_capacity(invites.len());
        for invite in invites {
            if !organization_ids.contains(&invite.organization_id) {
                organization_ids.push(invite.organization_id);
            }
        }

        Some(Self {
            user_id,
            invite_ids: invites.iter().map(|i| i.id).collect(),
            organization_ids,
            primary_organization_id: first.organization_id,
        })
    }
}

/// Outcome of reconciling a newly registered user's invites.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    /// Memberships created by this reconciliation
    pub memberships: Vec<Membership>,
    /// Primary organization assigned to the user, if any invite matched
    pub primary_organization_id: Option<i64>,
}

impl Reconciliation {
    /// Number of memberships created.
    pub fn applied_count(&self) -> usize {
        self.memberships.len()
    }
}
