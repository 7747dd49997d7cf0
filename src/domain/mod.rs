//! Domain layer for the issuegate gateway
//!
//! This module contains the tenant models, the error taxonomy and the port
//! traits implemented by infrastructure adapters.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
