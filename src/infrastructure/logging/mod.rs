//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty stdout output
//! - Optional rolling JSON log files
//! - `RUST_LOG` overrides of the configured level

pub mod logger;

pub use logger::LoggerImpl;
