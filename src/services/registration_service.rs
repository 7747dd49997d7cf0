//! Registration: persist the user together with their pending invites.

use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{normalize_email, NewUser, User};
use crate::domain::ports::{Notifier, OrganizationRepository, UserRepository};

use super::invite_reconciler::InviteReconciler;

const MAX_FIELD_LEN: usize = 255;

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub user: User,
    /// Memberships created from pending invites
    pub applied: usize,
}

pub struct RegistrationService {
    users: Arc<dyn UserRepository>,
    organizations: Arc<dyn OrganizationRepository>,
    reconciler: InviteReconciler,
    notifier: Arc<dyn Notifier>,
}

impl RegistrationService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        organizations: Arc<dyn OrganizationRepository>,
        reconciler: InviteReconciler,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            users,
            organizations,
            reconciler,
            notifier,
        }
    }

    fn validate(new_user: &NewUser) -> DomainResult<NewUser> {
        let name = new_user.name.trim();
        let email = normalize_email(&new_user.email);

        if name.is_empty() {
            return Err(DomainError::ValidationFailed("name is required".to_string()));
        }
        if name.len() > MAX_FIELD_LEN || email.len() > MAX_FIELD_LEN {
            return Err(DomainError::ValidationFailed(format!(
                "name and email must be at most {MAX_FIELD_LEN} characters"
            )));
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => {
                return Err(DomainError::ValidationFailed(format!(
                    "'{email}' is not an email address"
                )))
            }
        }

        Ok(NewUser {
            name: name.to_string(),
            email,
        })
    }

    /// Register a user and reconcile invites addressed to their email.
    #[instrument(skip(self, new_user))]
    pub async fn register(&self, new_user: &NewUser) -> DomainResult<Registration> {
        let new_user = Self::validate(new_user)?;
        if self.users.find_by_email(&new_user.email).await?.is_some() {
            return Err(DomainError::ValidationFailed(
                "email is already registered".to_string(),
            ));
        }

        let (user, reconciliation) = self.reconciler.register(&new_user).await?;

        for membership in &reconciliation.memberships {
            if let Some(organization) = self.organizations.get(membership.organization_id).await? {
                self.notifier.send_added_email(&user.email, &organization).await?;
            }
        }

        tracing::info!(
            user_id = user.id,
            applied = reconciliation.applied_count(),
            "User registered"
        );

        Ok(Registration {
            user,
            applied: reconciliation.applied_count(),
        })
    }
}
