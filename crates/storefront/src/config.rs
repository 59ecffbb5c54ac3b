//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_API_URL` - Base URL of the external store API
//!
//! ## Optional
//! - `STOREFRONT_DATA_DIR` - Directory for client-local storage (default: .corner-store)
//! - `STOREFRONT_API_TIMEOUT_SECS` - Per-request timeout in seconds (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_DATA_DIR: &str = ".corner-store";
const DEFAULT_TIMEOUT_SECS: &str = "10";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the external API (always ends with `/`)
    pub api_url: Url,
    /// Directory backing client-local storage
    pub data_dir: PathBuf,
    /// Timeout applied to every API request
    pub api_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Values that take precedence over the environment (e.g., CLI flags).
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub data_dir: Option<PathBuf>,
}

impl StorefrontConfig {
    /// Configuration with defaults for everything but the API and storage
    /// locations.
    #[must_use]
    pub fn new(api_url: Url, data_dir: PathBuf) -> Self {
        Self {
            api_url: with_trailing_slash(api_url),
            data_dir,
            api_timeout: Duration::from_secs(10),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok(), overrides)
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F, overrides: ConfigOverrides) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_api_url = match overrides.api_url {
            Some(url) => url,
            None => get_required(&lookup, "STOREFRONT_API_URL")?,
        };
        let api_url = parse_api_url(&raw_api_url, "STOREFRONT_API_URL")?;

        let data_dir = overrides.data_dir.unwrap_or_else(|| {
            PathBuf::from(get_or_default(&lookup, "STOREFRONT_DATA_DIR", DEFAULT_DATA_DIR))
        });

        let timeout_secs = get_or_default(&lookup, "STOREFRONT_API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_API_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            api_url,
            data_dir,
            api_timeout: Duration::from_secs(timeout_secs),
            sentry_dsn: lookup("SENTRY_DSN").filter(|s| !s.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT").filter(|s| !s.is_empty()),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required variable.
fn get_required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a variable with a default value.
fn get_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| default.to_string())
}

/// Parse the API base URL, requiring an http(s) scheme.
fn parse_api_url(raw: &str, var_name: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(with_trailing_slash(url))
}

/// Ensure the path ends with `/` so endpoint paths append instead of replace.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_api_url() {
        let result = StorefrontConfig::from_lookup(lookup_from(&[]), ConfigOverrides::default());
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(ref k)) if k == "STOREFRONT_API_URL"));
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::from_lookup(
            lookup_from(&[("STOREFRONT_API_URL", "http://localhost:5000/api")]),
            ConfigOverrides::default(),
        )
        .unwrap();

        assert_eq!(config.api_url.as_str(), "http://localhost:5000/api/");
        assert_eq!(config.data_dir, PathBuf::from(".corner-store"));
        assert_eq!(config.api_timeout, Duration::from_secs(10));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config = StorefrontConfig::from_lookup(
            lookup_from(&[
                ("STOREFRONT_API_URL", "http://env.example/"),
                ("STOREFRONT_DATA_DIR", "/from/env"),
            ]),
            ConfigOverrides {
                api_url: Some("https://flag.example".to_string()),
                data_dir: Some(PathBuf::from("/from/flag")),
            },
        )
        .unwrap();

        assert_eq!(config.api_url.as_str(), "https://flag.example/");
        assert_eq!(config.data_dir, PathBuf::from("/from/flag"));
    }

    #[test]
    fn test_invalid_timeout() {
        let result = StorefrontConfig::from_lookup(
            lookup_from(&[
                ("STOREFRONT_API_URL", "http://localhost"),
                ("STOREFRONT_API_TIMEOUT_SECS", "soon"),
            ]),
            ConfigOverrides::default(),
        );
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let result = StorefrontConfig::from_lookup(
            lookup_from(&[("STOREFRONT_API_URL", "ftp://files.example")]),
            ConfigOverrides::default(),
        );
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_empty_sentry_dsn_is_none() {
        let config = StorefrontConfig::from_lookup(
            lookup_from(&[("STOREFRONT_API_URL", "http://localhost"), ("SENTRY_DSN", "")]),
            ConfigOverrides::default(),
        )
        .unwrap();
        assert!(config.sentry_dsn.is_none());
    }
}
