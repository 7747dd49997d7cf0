//! Adapters for external systems: SQLite persistence, the GitHub REST API,
//! the HTTP API and notifications.

pub mod github;
pub mod http;
pub mod notifier;
pub mod sqlite;
