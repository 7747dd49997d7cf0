//! issuegate - multi-tenant GitHub App gateway
//!
//! Organizations bind a GitHub App installation; their members list, create,
//! update and close issues in the organization's selected repository through
//! short-lived installation tokens minted on demand.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): tenant models, errors and port traits
//! - **Service Layer** (`services`): label policy, invite reconciliation and
//!   the organization, user, issue and registration use cases
//! - **Adapters** (`adapters`): SQLite repositories, the GitHub App gateway
//!   and the HTTP API
//! - **Infrastructure Layer** (`infrastructure`): configuration, logging and
//!   encryption at rest
//! - **CLI Layer** (`cli`): command-line interface

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use adapters::github::{AppCredentials, CallOutcome, GitHubGateway, ProviderRequest};
pub use domain::models::{
    Config, DatabaseConfig, GitHubAppConfig, Invite, LoggingConfig, Membership, MembershipRole,
    Organization, User,
};
pub use domain::ports::{
    CredentialMinter, InviteRepository, MembershipRepository, Notifier, OrganizationRepository,
    UserRepository,
};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{InviteReconciler, IssueService, OrganizationService, UserService};
