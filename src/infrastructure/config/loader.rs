use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("github.app_id is required")]
    MissingAppId,

    #[error("github.private_key_path is required")]
    MissingPrivateKey,

    #[error("Cannot read GitHub App private key at {path}: {reason}")]
    UnreadablePrivateKey { path: String, reason: String },

    #[error("Invalid GitHub App private key: {0}")]
    InvalidPrivateKey(String),

    #[error("security.app_key is required to encrypt installation ids")]
    MissingAppKey,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid request_timeout_secs: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    #[error("Invalid issues_per_page: {0}. Must be between 1 and 100")]
    InvalidPageSize(u32),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

const ENV_PREFIX: &str = "ISSUEGATE_";

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. issuegate.yaml in the working directory
    /// 3. issuegate.local.yaml (local overrides, optional)
    /// 4. Environment variables (ISSUEGATE_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        let config: Config = Self::figment(
            [Path::new("issuegate.yaml"), Path::new("issuegate.local.yaml")],
            ENV_PREFIX,
        )
        .extract()
        .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring env overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file {} does not exist", path.display());
        }

        let config: Config = Self::figment([path], ENV_PREFIX)
            .extract()
            .context(format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment<'a>(files: impl IntoIterator<Item = &'a Path>, env_prefix: &str) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        for file in files {
            figment = figment.merge(Yaml::file(file));
        }
        figment.merge(Env::prefixed(env_prefix).split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let github = &config.github;
        if github.app_id.trim().is_empty() {
            return Err(ConfigError::MissingAppId);
        }

        match &github.private_key_path {
            None => return Err(ConfigError::MissingPrivateKey),
            Some(path) if !path.is_file() => {
                return Err(ConfigError::UnreadablePrivateKey {
                    path: path.display().to_string(),
                    reason: "file does not exist".to_string(),
                });
            }
            Some(_) => {}
        }

        if github.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(github.request_timeout_secs));
        }

        if github.issues_per_page == 0 || github.issues_per_page > 100 {
            return Err(ConfigError::InvalidPageSize(github.issues_per_page));
        }

        if github.api_base_url.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "github.api_base_url cannot be empty".to_string(),
            ));
        }

        if config.security.app_key.is_empty() {
            return Err(ConfigError::MissingAppKey);
        }

        Ok(())
    }
}
