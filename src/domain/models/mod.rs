//! Domain models for the issuegate gateway.

pub mod config;
pub mod installation_token;
pub mod invite;
pub mod membership;
pub mod organization;
pub mod user;

pub use config::{
    Config, DatabaseConfig, GitHubAppConfig, LogFormat, LoggingConfig, RotationPolicy,
    SecurityConfig, ServerConfig,
};
pub use installation_token::InstallationToken;
pub use invite::{normalize_email, Invite, Reconciliation, ReconciliationPlan};
pub use membership::{Membership, MembershipRole, NewMembership};
pub use organization::{join_labels, normalize_labels, split_labels, Organization, LABEL_DELIMITER};
pub use user::{NewUser, User, WorkspaceSelection};
