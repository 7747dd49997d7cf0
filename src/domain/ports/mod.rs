//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that infrastructure adapters must implement:
//! - OrganizationRepository, MembershipRepository, InviteRepository, UserRepository:
//!   tenant persistence
//! - CredentialMinter: GitHub App installation token exchange
//! - Notifier: invitation and membership emails
//!
//! These traits define the contracts that allow the domain to be independent
//! of specific infrastructure implementations.

pub mod credential_minter;
pub mod invite_repository;
pub mod membership_repository;
pub mod notifier;
pub mod organization_repository;
pub mod user_repository;

pub use credential_minter::CredentialMinter;
pub use invite_repository::InviteRepository;
pub use membership_repository::MembershipRepository;
pub use notifier::Notifier;
pub use organization_repository::{ActivatedOrganization, OrganizationRepository};
pub use user_repository::UserRepository;
