//! Admin client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CATALOG_API_BASE` - Base URL of the e-commerce API (e.g. `https://ec-course-api.hexschool.io/v2`)
//! - `CATALOG_API_PATH` - Tenant path segment assigned to the administrator
//!
//! ## Optional
//! - `CATALOG_SESSION_FILE` - Where the `hexToken` session record is kept
//!   (default: `<config dir>/catalog-admin/session`)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Directory name under the platform config dir.
const CONFIG_DIR_NAME: &str = "catalog-admin";

/// Session file name inside [`CONFIG_DIR_NAME`].
const SESSION_FILE_NAME: &str = "session";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Admin client configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Remote API location
    pub api: ApiConfig,
    /// Session record location
    pub session_file: PathBuf,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
}

/// Where the catalog API lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// API base URL (http or https)
    pub base_url: Url,
    /// Tenant path segment, inserted as `/api/{api_path}/admin/...`
    pub api_path: String,
}

impl ApiConfig {
    /// Build and validate an API configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the base URL is not an
    /// http(s) URL or the path is empty or contains `/`.
    pub fn new(base_url: &str, api_path: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            api_path: validate_api_path(api_path)?,
        })
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required keys are missing or invalid.
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()));

        let api = ApiConfig::new(&required("CATALOG_API_BASE")?, &required("CATALOG_API_PATH")?)?;

        let session_file = lookup("CATALOG_SESSION_FILE")
            .filter(|path| !path.trim().is_empty())
            .map_or_else(default_session_file, PathBuf::from);

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            api,
            session_file,
            log_format,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Default session file under the platform config directory.
fn default_session_file() -> PathBuf {
    dirs::config_dir().map_or_else(
        || PathBuf::from(".catalog-admin-session"),
        |dir| dir.join(CONFIG_DIR_NAME).join(SESSION_FILE_NAME),
    )
}

/// Parse and check the API base URL.
fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("CATALOG_API_BASE".to_string(), reason);

    let url = Url::parse(value.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("must be a hierarchical URL".to_string()));
    }
    Ok(url)
}

/// Check the tenant path segment.
fn validate_api_path(value: &str) -> Result<String, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidEnvVar("CATALOG_API_PATH".to_string(), reason.to_string());

    let path = value.trim();
    if path.is_empty() {
        return Err(invalid("cannot be empty"));
    }
    if path.contains('/') {
        return Err(invalid("must be a single path segment"));
    }
    Ok(path.to_string())
}
