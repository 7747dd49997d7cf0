//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - Programmatic defaults
//! - YAML file loading
//! - `ISSUEGATE_*` environment variable overrides
//! - Startup validation

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
