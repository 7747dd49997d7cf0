//! User repository port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{NewUser, User, WorkspaceSelection};

/// Repository interface for User persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &NewUser) -> DomainResult<User>;

    async fn get(&self, id: i64) -> DomainResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    /// Overwrite the workspace fields that are `Some` in `selection`.
    async fn update_workspace(&self, id: i64, selection: &WorkspaceSelection) -> DomainResult<User>;
}
