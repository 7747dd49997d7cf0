//! Application services.
//!
//! Services own the gateway's use cases and talk to persistence through the
//! repository ports and to GitHub through [`GitHubGateway`].
//!
//! [`GitHubGateway`]: crate::adapters::github::GitHubGateway

pub mod access;
pub mod invite_reconciler;
pub mod issue_service;
pub mod label_policy;
pub mod organization_service;
pub mod registration_service;
pub mod user_service;

pub use invite_reconciler::InviteReconciler;
pub use issue_service::{IssueDraft, IssueListRequest, IssueListing, IssueService};
pub use label_policy::{effective_filter, effective_payload_labels, parse_label_query};
pub use organization_service::{AddUserOutcome, OrganizationService};
pub use registration_service::{Registration, RegistrationService};
pub use user_service::{RepositoryListing, RepositorySummary, UserService};
