//! GitHub App integration.
//!
//! - [`app_auth`]: App JWT signing and installation token exchange
//! - [`token_cache`]: single-flight per-installation token cache
//! - [`client`]: installation-scoped REST client
//! - [`gateway`]: the request wrapper and typed issue/label/repository calls
//! - [`pagination`]: `Link` header parsing

pub mod app_auth;
pub mod client;
pub mod gateway;
pub mod models;
pub mod pagination;
pub mod token_cache;

pub use app_auth::{AppCredentials, GitHubAppMinter};
pub use client::{InstallationClient, ProviderRequest, ProviderResponse};
pub use gateway::{CallOutcome, GitHubGateway, IssuePage, IssueQuery};
pub use models::{
    GitHubAccount, GitHubIssue, GitHubIssueWrite, GitHubLabel, GitHubRepository,
    GitHubRepositoryList,
};
pub use pagination::{last_page, parse_link_header, LinkPagination};
pub use token_cache::InstallationTokenCache;
