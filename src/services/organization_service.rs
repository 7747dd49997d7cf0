//! Organization service: App activation, label policy and membership
//! administration.

use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    normalize_email, normalize_labels, Invite, Membership, MembershipRole, NewMembership,
    Organization, User, WorkspaceSelection,
};
use crate::domain::ports::{
    ActivatedOrganization, InviteRepository, MembershipRepository, Notifier,
    OrganizationRepository, UserRepository,
};

use super::access::{require_admin, require_member};

/// What `add_user` did for an email address.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AddUserOutcome {
    /// The email belongs to a registered user, who is now a member.
    Added { membership: Membership },
    /// No user has that email yet; an invite is pending.
    Invited { invite: Invite },
}

pub struct OrganizationService {
    organizations: Arc<dyn OrganizationRepository>,
    memberships: Arc<dyn MembershipRepository>,
    invites: Arc<dyn InviteRepository>,
    users: Arc<dyn UserRepository>,
    notifier: Arc<dyn Notifier>,
}

impl OrganizationService {
    pub fn new(
        organizations: Arc<dyn OrganizationRepository>,
        memberships: Arc<dyn MembershipRepository>,
        invites: Arc<dyn InviteRepository>,
        users: Arc<dyn UserRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            organizations,
            memberships,
            invites,
            users,
            notifier,
        }
    }

    /// Bind an App installation to an organization on the installation
    /// callback.
    ///
    /// Repeated callbacks for the same installation return the same
    /// organization. The user who creates it becomes its admin; for an
    /// existing organization the caller must already be a member. It becomes
    /// their primary organization if they had none.
    #[instrument(skip(self, user, installation_id), fields(user_id = user.id))]
    pub async fn activate(
        &self,
        user: &User,
        installation_id: &str,
        name: Option<&str>,
    ) -> DomainResult<ActivatedOrganization> {
        let installation_id = installation_id.trim();
        if installation_id.is_empty() {
            return Err(DomainError::ValidationFailed(
                "installation_id cannot be empty".to_string(),
            ));
        }
        let name = name.map(str::trim).filter(|n| !n.is_empty());

        let activated = self
            .organizations
            .find_or_create_by_installation(installation_id, name)
            .await?;
        let organization_id = activated.organization.id;

        // Only the caller that created the organization is made its admin.
        // Anyone else must already belong to it.
        let admin_granted = if activated.created {
            let (_, inserted) = self
                .memberships
                .create(&NewMembership {
                    user_id: user.id,
                    organization_id,
                    role: MembershipRole::Admin,
                })
                .await?;
            inserted
        } else {
            require_member(&*self.organizations, &*self.memberships, user, organization_id).await?;
            false
        };

        if user.organization_id.is_none() {
            self.users
                .update_workspace(
                    user.id,
                    &WorkspaceSelection {
                        organization_id: Some(organization_id),
                        ..Default::default()
                    },
                )
                .await?;
        }

        tracing::info!(
            organization_id,
            created = activated.created,
            admin_granted,
            "Organization activated"
        );
        Ok(activated)
    }

    /// Replace the label policy. Omitted lists keep their stored value.
    #[instrument(skip(self, actor, mandatory_labels, added_labels), fields(actor_id = actor.id))]
    pub async fn update_labels(
        &self,
        actor: &User,
        organization_id: i64,
        mandatory_labels: Option<Vec<String>>,
        added_labels: Option<Vec<String>>,
    ) -> DomainResult<Organization> {
        require_admin(&*self.organizations, &*self.memberships, actor, organization_id).await?;

        let mandatory = mandatory_labels.as_deref().map(normalize_labels).transpose()?;
        let added = added_labels.as_deref().map(normalize_labels).transpose()?;

        self.organizations
            .update_labels(organization_id, mandatory.as_deref(), added.as_deref())
            .await
    }

    /// Add a registered user by email, or invite the email if unknown.
    #[instrument(skip(self, actor, email), fields(actor_id = actor.id))]
    pub async fn add_user(
        &self,
        actor: &User,
        organization_id: i64,
        email: &str,
    ) -> DomainResult<AddUserOutcome> {
        let organization =
            require_admin(&*self.organizations, &*self.memberships, actor, organization_id).await?;

        let email = normalize_email(email);
        if !email.contains('@') {
            return Err(DomainError::ValidationFailed(format!("'{email}' is not an email address")));
        }

        if let Some(user) = self.users.find_by_email(&email).await? {
            let (membership, inserted) = self
                .memberships
                .create(&NewMembership {
                    user_id: user.id,
                    organization_id,
                    role: MembershipRole::Regular,
                })
                .await?;
            if inserted {
                self.notifier.send_added_email(&email, &organization).await?;
            }
            return Ok(AddUserOutcome::Added { membership });
        }

        let invite = self.invites.create(&email, organization_id).await?;
        self.notifier.send_invite_email(&email, &organization).await?;
        Ok(AddUserOutcome::Invited { invite })
    }

    /// Remove a user's membership.
    #[instrument(skip(self, actor), fields(actor_id = actor.id))]
    pub async fn remove_user(
        &self,
        actor: &User,
        organization_id: i64,
        user_id: i64,
    ) -> DomainResult<()> {
        require_admin(&*self.organizations, &*self.memberships, actor, organization_id).await?;
        self.memberships.delete(user_id, organization_id).await
    }

    #[instrument(skip(self, actor), fields(actor_id = actor.id))]
    pub async fn change_role(
        &self,
        actor: &User,
        organization_id: i64,
        user_id: i64,
        role: MembershipRole,
    ) -> DomainResult<Membership> {
        require_admin(&*self.organizations, &*self.memberships, actor, organization_id).await?;
        self.memberships.update_role(user_id, organization_id, role).await
    }

    /// Named organizations the user belongs to.
    pub async fn organizations(&self, user: &User) -> DomainResult<Vec<Organization>> {
        let organizations = self.organizations.list_for_user(user.id).await?;
        Ok(organizations
            .into_iter()
            .filter(|o| o.name.as_deref().is_some_and(|n| !n.is_empty()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{
        create_migrated_test_pool, SqliteInviteRepository, SqliteMembershipRepository,
        SqliteOrganizationRepository, SqliteUserRepository,
    };
    use crate::domain::models::NewUser;
    use crate::infrastructure::crypto::InstallationCipher;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(&'static str, String, i64)>>,
    }

    impl RecordingNotifier {
        fn sent(&self) -> Vec<(&'static str, String, i64)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_invite_email(&self, email: &str, organization: &Organization) -> DomainResult<()> {
            self.sent.lock().unwrap().push(("invite", email.to_string(), organization.id));
            Ok(())
        }

        async fn send_added_email(&self, email: &str, organization: &Organization) -> DomainResult<()> {
            self.sent.lock().unwrap().push(("added", email.to_string(), organization.id));
            Ok(())
        }
    }

    struct Fixture {
        service: OrganizationService,
        users: Arc<SqliteUserRepository>,
        memberships: Arc<SqliteMembershipRepository>,
        notifier: Arc<RecordingNotifier>,
    }

    async fn fixture() -> Fixture {
        let pool = create_migrated_test_pool().await.unwrap();
        let cipher = Arc::new(InstallationCipher::new("test-app-key"));
        let users = Arc::new(SqliteUserRepository::new(pool.clone()));
        let memberships = Arc::new(SqliteMembershipRepository::new(pool.clone()));
        let notifier = Arc::new(RecordingNotifier::default());
        let service = OrganizationService::new(
            Arc::new(SqliteOrganizationRepository::new(pool.clone(), cipher)),
            memberships.clone(),
            Arc::new(SqliteInviteRepository::new(pool)),
            users.clone(),
            notifier.clone(),
        );
        Fixture { service, users, memberships, notifier }
    }

    async fn user(fx: &Fixture, email: &str) -> User {
        fx.users
            .create(&NewUser { name: "Test".to_string(), email: email.to_string() })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_activate_is_idempotent() {
        let fx = fixture().await;
        let admin = user(&fx, "admin@example.com").await;

        let first = fx.service.activate(&admin, "1001", Some("Acme")).await.unwrap();
        let second = fx.service.activate(&admin, "1001", None).await.unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.organization.id, second.organization.id);
        assert_eq!(second.organization.installation(), Some("1001"));

        let membership = fx
            .memberships
            .find_by_user_and_org(admin.id, first.organization.id)
            .await
            .unwrap()
            .unwrap();
        assert!(membership.is_admin());

        let admin = fx.users.get(admin.id).await.unwrap().unwrap();
        assert_eq!(admin.organization_id, Some(first.organization.id));
    }

    #[tokio::test]
    async fn test_activate_existing_installation_requires_membership() {
        let fx = fixture().await;
        let admin = user(&fx, "admin@example.com").await;
        let org = fx.service.activate(&admin, "1001", Some("Acme")).await.unwrap().organization;

        let outsider = user(&fx, "mallory@example.com").await;
        let err = fx.service.activate(&outsider, "1001", None).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert!(fx
            .memberships
            .find_by_user_and_org(outsider.id, org.id)
            .await
            .unwrap()
            .is_none());
        let outsider = fx.users.get(outsider.id).await.unwrap().unwrap();
        assert!(outsider.organization_id.is_none());

        let member = user(&fx, "member@example.com").await;
        fx.service.add_user(&admin, org.id, "member@example.com").await.unwrap();
        let again = fx.service.activate(&member, "1001", None).await.unwrap();
        assert_eq!(again.organization.id, org.id);
        let membership = fx
            .memberships
            .find_by_user_and_org(member.id, org.id)
            .await
            .unwrap()
            .unwrap();
        assert!(!membership.is_admin());
    }

    #[tokio::test]
    async fn test_activate_rejects_empty_installation() {
        let fx = fixture().await;
        let admin = user(&fx, "admin@example.com").await;
        let err = fx.service.activate(&admin, "  ", None).await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_update_labels_requires_admin() {
        let fx = fixture().await;
        let admin = user(&fx, "admin@example.com").await;
        let org = fx.service.activate(&admin, "1001", Some("Acme")).await.unwrap().organization;

        let member = user(&fx, "member@example.com").await;
        fx.service.add_user(&admin, org.id, "member@example.com").await.unwrap();

        let err = fx
            .service
            .update_labels(&member, org.id, Some(vec!["bug".to_string()]), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let updated = fx
            .service
            .update_labels(&admin, org.id, Some(vec![" bug ".to_string(), String::new()]), None)
            .await
            .unwrap();
        assert_eq!(updated.mandatory_labels, vec!["bug".to_string()]);
        assert!(updated.added_labels.is_empty());

        let err = fx
            .service
            .update_labels(&admin, org.id, None, Some(vec!["a,b".to_string()]))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_add_user_invites_unknown_email_once() {
        let fx = fixture().await;
        let admin = user(&fx, "admin@example.com").await;
        let org = fx.service.activate(&admin, "1001", Some("Acme")).await.unwrap().organization;

        let first = fx.service.add_user(&admin, org.id, "New@Example.com").await.unwrap();
        let second = fx.service.add_user(&admin, org.id, "new@example.com").await.unwrap();

        let (AddUserOutcome::Invited { invite: a }, AddUserOutcome::Invited { invite: b }) = (first, second) else {
            panic!("expected invites");
        };
        assert_eq!(a.id, b.id);
        assert_eq!(
            fx.notifier.sent(),
            vec![("invite", "new@example.com".to_string(), org.id); 2]
        );
    }

    #[tokio::test]
    async fn test_add_existing_user_and_manage_role() {
        let fx = fixture().await;
        let admin = user(&fx, "admin@example.com").await;
        let org = fx.service.activate(&admin, "1001", Some("Acme")).await.unwrap().organization;
        let bob = user(&fx, "bob@example.com").await;

        let outcome = fx.service.add_user(&admin, org.id, "bob@example.com").await.unwrap();
        assert!(matches!(outcome, AddUserOutcome::Added { ref membership } if membership.user_id == bob.id));
        assert_eq!(fx.notifier.sent(), vec![("added", "bob@example.com".to_string(), org.id)]);

        let promoted = fx
            .service
            .change_role(&admin, org.id, bob.id, MembershipRole::Admin)
            .await
            .unwrap();
        assert!(promoted.is_admin());

        fx.service.remove_user(&admin, org.id, bob.id).await.unwrap();
        let err = fx.service.remove_user(&admin, org.id, bob.id).await.unwrap_err();
        assert!(matches!(err, DomainError::MembershipNotFound { .. }));
    }

    #[tokio::test]
    async fn test_organizations_lists_named_memberships() {
        let fx = fixture().await;
        let admin = user(&fx, "admin@example.com").await;
        fx.service.activate(&admin, "1001", Some("Acme")).await.unwrap();
        fx.service.activate(&admin, "1002", None).await.unwrap();

        let organizations = fx.service.organizations(&admin).await.unwrap();
        assert_eq!(organizations.len(), 1);
        assert_eq!(organizations[0].name.as_deref(), Some("Acme"));
    }
}
