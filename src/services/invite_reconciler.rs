//! Turns pending email invitations into memberships at registration.

use std::sync::Arc;

use tracing::instrument;

use crate::domain::errors::DomainResult;
use crate::domain::models::{NewUser, Reconciliation, ReconciliationPlan, User};
use crate::domain::ports::InviteRepository;

pub struct InviteReconciler {
    invites: Arc<dyn InviteRepository>,
}

impl InviteReconciler {
    pub fn new(invites: Arc<dyn InviteRepository>) -> Self {
        Self { invites }
    }

    /// Consume every active invite addressed to `email`.
    ///
    /// Creates one regular membership per invited organization the user
    /// does not already belong to, deactivates the invites and makes the
    /// earliest invite's organization the user's primary one. All of it
    /// commits together or not at all.
    #[instrument(skip(self, email))]
    pub async fn reconcile(&self, email: &str, user_id: i64) -> DomainResult<Reconciliation> {
        let invites = self.invites.find_active_by_email(email).await?;
        let Some(plan) = ReconciliationPlan::from_invites(user_id, &invites) else {
            return Ok(Reconciliation::default());
        };

        let memberships = self.invites.apply_reconciliation(&plan).await?;
        tracing::info!(
            invites = plan.invite_ids.len(),
            memberships = memberships.len(),
            primary_organization_id = plan.primary_organization_id,
            "Reconciled pending invites"
        );

        Ok(Reconciliation {
            memberships,
            primary_organization_id: Some(plan.primary_organization_id),
        })
    }

    /// Create a user and consume its invites in one step.
    ///
    /// If reconciliation fails the user is not persisted either, so the
    /// same registration can simply be retried.
    #[instrument(skip(self, new_user))]
    pub async fn register(&self, new_user: &NewUser) -> DomainResult<(User, Reconciliation)> {
        let (user, reconciliation) = self.invites.create_user_with_invites(new_user).await?;
        if let Some(primary_organization_id) = reconciliation.primary_organization_id {
            tracing::info!(
                user_id = user.id,
                memberships = reconciliation.applied_count(),
                primary_organization_id,
                "Reconciled pending invites"
            );
        }
        Ok((user, reconciliation))
    }
}
