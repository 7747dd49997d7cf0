//! Infrastructure layer module
//!
//! - Configuration management
//! - Logging
//! - Encryption of installation identifiers at rest

pub mod config;
pub mod crypto;
pub mod logging;
