use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for issuegate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// GitHub App configuration
    #[serde(default)]
    pub github: GitHubAppConfig,

    /// Encryption-at-rest configuration
    #[serde(default)]
    pub security: SecurityConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    3333
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".issuegate/issuegate.db".to_string()
}

const fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Log file rotation policy
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format for stdout: json or pretty
    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// Directory for JSON log files (stdout only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Rotation policy for log files
    #[serde(default)]
    pub rotation: RotationPolicy,
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: RotationPolicy::default(),
        }
    }
}

/// GitHub App configuration
///
/// Loaded once at startup and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GitHubAppConfig {
    /// Base URL of the GitHub REST API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Numeric App identifier
    #[serde(default)]
    pub app_id: String,

    /// Path to the App's PEM-encoded RSA private key
    #[serde(default)]
    pub private_key_path: Option<PathBuf>,

    /// OAuth client identifier of the App
    #[serde(default)]
    pub client_id: Option<String>,

    /// OAuth client secret of the App
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Timeout applied to every outbound GitHub request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Installation tokens closer than this to expiry are re-minted
    #[serde(default = "default_token_refresh_margin_secs")]
    pub token_refresh_margin_secs: u64,

    /// Page size used when listing issues
    #[serde(default = "default_issues_per_page")]
    pub issues_per_page: u32,
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

const fn default_request_timeout_secs() -> u64 {
    10
}

const fn default_token_refresh_margin_secs() -> u64 {
    60
}

const fn default_issues_per_page() -> u32 {
    6
}

impl Default for GitHubAppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            app_id: String::new(),
            private_key_path: None,
            client_id: None,
            client_secret: None,
            request_timeout_secs: default_request_timeout_secs(),
            token_refresh_margin_secs: default_token_refresh_margin_secs(),
            issues_per_page: default_issues_per_page(),
        }
    }
}

/// Encryption-at-rest configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SecurityConfig {
    /// Application-wide secret used to encrypt installation identifiers
    #[serde(default)]
    pub app_key: String,
}
