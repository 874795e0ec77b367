//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SITE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `SITE_BASE_URL` - Public URL for the site
//!
//! ## Optional
//! - `SITE_HOST` - Bind address (default: 127.0.0.1)
//! - `SITE_PORT` - Listen port (default: 3000)
//! - `POPUP_ENABLED` - Global popup switch (default: true)
//! - `POPUP_SHOW_AFTER_SECONDS` - Delay before exit intent is armed (default: 5)
//! - `POPUP_EXCLUDED_PATHS` - Comma-separated path prefixes without the popup
//!   (default: `/bonus,/api/,/popup`)
//! - `POPUP_RESET_ON_PAGE_LOAD` - Clear the session dismissal on every full
//!   page load (default: true)
//! - `NEWSLETTER_SUBSCRIBE_URL` - Subscription endpoint used by the popup
//!   (default: `{SITE_BASE_URL}/api/newsletter/subscribe`)
//! - `KLAVIYO_API_KEY` / `KLAVIYO_LIST_ID` - Forward subscriptions to Klaviyo
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sample rates (default: 1.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use tradepath_core::PopupConfig;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_SHOW_AFTER_SECONDS: u32 = 5;
const DEFAULT_EXCLUDED_PATHS: &str = "/bonus,/api/,/popup";
const SUBSCRIBE_PATH: &str = "/api/newsletter/subscribe";

/// Klaviyo API base URL.
pub const KLAVIYO_BASE_URL: &str = "https://a.klaviyo.com/api";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Site application configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the site
    pub base_url: String,
    /// Exit-intent popup settings
    pub popup: PopupSettings,
    /// Endpoint the popup posts subscriptions to
    pub subscribe_url: String,
    /// Klaviyo forwarding (optional)
    pub klaviyo: Option<KlaviyoConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Exit-intent popup settings shared by every route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupSettings {
    /// Global switch
    pub enabled: bool,
    /// Seconds before the exit-intent listener is armed
    pub show_after_seconds: u32,
    /// Path prefixes where the popup never renders
    pub excluded_paths: Vec<String>,
    /// Clear the session dismissal on each full page load
    pub reset_on_page_load: bool,
}

impl Default for PopupSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            show_after_seconds: DEFAULT_SHOW_AFTER_SECONDS,
            excluded_paths: split_paths(DEFAULT_EXCLUDED_PATHS),
            reset_on_page_load: true,
        }
    }
}

impl PopupSettings {
    /// Derive the popup config for a request path.
    #[must_use]
    pub fn config_for(&self, path: &str) -> PopupConfig {
        let excluded = self
            .excluded_paths
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()));

        if !self.enabled || excluded {
            return PopupConfig {
                enabled: false,
                show_after_seconds: self.show_after_seconds,
            };
        }

        PopupConfig {
            enabled: true,
            show_after_seconds: self.show_after_seconds,
        }
    }

    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            enabled: get_bool_env("POPUP_ENABLED", true)?,
            show_after_seconds: get_env_or_default(
                "POPUP_SHOW_AFTER_SECONDS",
                &DEFAULT_SHOW_AFTER_SECONDS.to_string(),
            )
            .parse::<u32>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("POPUP_SHOW_AFTER_SECONDS".to_string(), e.to_string())
            })?,
            excluded_paths: split_paths(&get_env_or_default(
                "POPUP_EXCLUDED_PATHS",
                DEFAULT_EXCLUDED_PATHS,
            )),
            reset_on_page_load: get_bool_env("POPUP_RESET_ON_PAGE_LOAD", true)?,
        })
    }
}

/// Klaviyo list forwarding configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct KlaviyoConfig {
    /// Klaviyo private API key
    pub api_key: SecretString,
    /// Newsletter list ID
    pub list_id: String,
    /// API base URL (overridable for tests)
    pub base_url: String,
}

impl std::fmt::Debug for KlaviyoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KlaviyoConfig")
            .field("api_key", &"[REDACTED]")
            .field("list_id", &self.list_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl KlaviyoConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        match (
            get_optional_env("KLAVIYO_API_KEY"),
            get_optional_env("KLAVIYO_LIST_ID"),
        ) {
            (Some(key), Some(list_id)) => {
                validate_secret_strength(&key, "KLAVIYO_API_KEY")?;
                Ok(Some(Self {
                    api_key: SecretString::from(key),
                    list_id,
                    base_url: KLAVIYO_BASE_URL.to_string(),
                }))
            }
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::MissingEnvVar("KLAVIYO_LIST_ID".to_string())),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar("KLAVIYO_API_KEY".to_string())),
        }
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("SITE_DATABASE_URL")?;
        let host = get_env_or_default("SITE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SITE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("SITE_BASE_URL")?
            .trim_end_matches('/')
            .to_string();
        url::Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_BASE_URL".to_string(), e.to_string()))?;

        let subscribe_url = get_optional_env("NEWSLETTER_SUBSCRIBE_URL")
            .unwrap_or_else(|| format!("{base_url}{SUBSCRIBE_PATH}"));

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            popup: PopupSettings::from_env()?,
            subscribe_url,
            klaviyo: KlaviyoConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_optional_env("SENTRY_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1.0),
            sentry_traces_sample_rate: get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1.0),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a boolean environment variable (`true`/`false`/`1`/`0`).
fn get_bool_env(key: &str, default: bool) -> Result<bool, ConfigError> {
    match get_optional_env(key) {
        None => Ok(default),
        Some(value) => parse_bool(&value)
            .ok_or_else(|| ConfigError::InvalidEnvVar(key.to_string(), format!("not a boolean: {value}"))),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Split a comma-separated list of path prefixes.
fn split_paths(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key issued by Klaviyo."
            ),
        ));
    }

    Ok(())
}
