//! Fixture builder configuration.
//!
//! Configuration is loaded from environment variables. The mock server base
//! URL is the only required value; it is injected into the transport at
//! construction time instead of being read from a global.

use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Environment variable holding the mock BBB server base URL.
pub const MOCK_SERVER_ENV_VAR: &str = "TEST_MOD_BIGBLUEBUTTONBN_MOCK_SERVER";

/// Default site root used when building callback URLs.
pub const DEFAULT_SITE_URL: &str = "http://localhost";

/// Default timeout for mock server requests in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;

/// Upper bound for the mock server request timeout in seconds.
pub const MAX_REQUEST_TIMEOUT_SECONDS: u64 = 300;

/// Default `bbb-origin` meta value for mocked meetings.
pub const DEFAULT_ORIGIN: &str = "Moodle";

/// Fixture builder configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the mock BBB server (e.g. "http://localhost:8001/hash").
    pub mock_server_url: String,

    /// Site root for callback URLs embedded in recording meta data.
    pub site_url: String,

    /// Timeout applied to every mock server request.
    pub request_timeout_seconds: u64,

    /// Value sent as `bbb-origin` when mocking meetings.
    pub origin: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid URL configuration: {0}")]
    InvalidUrl(String),

    #[error("Invalid request timeout configuration: {0}")]
    InvalidTimeout(String),
}

impl Config {
    /// Build a configuration pointing at `mock_server_url` with defaults for
    /// everything else.
    pub fn new(mock_server_url: impl Into<String>) -> Self {
        Self {
            mock_server_url: trim_trailing_slash(mock_server_url.into()),
            site_url: DEFAULT_SITE_URL.to_string(),
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
            origin: DEFAULT_ORIGIN.to_string(),
        }
    }

    /// Override the site root used in callback URLs.
    #[must_use]
    pub fn with_site_url(mut self, site_url: impl Into<String>) -> Self {
        self.site_url = trim_trailing_slash(site_url.into());
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mock_server_url = vars
            .get(MOCK_SERVER_ENV_VAR)
            .ok_or_else(|| ConfigError::MissingEnvVar(MOCK_SERVER_ENV_VAR.to_string()))?;
        validate_http_url(MOCK_SERVER_ENV_VAR, mock_server_url)?;

        let site_url = vars
            .get("BBB_FIXTURE_SITE_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_SITE_URL.to_string());
        validate_http_url("BBB_FIXTURE_SITE_URL", &site_url)?;

        // Parse request timeout with validation
        let request_timeout_seconds =
            if let Some(value_str) = vars.get("BBB_MOCK_REQUEST_TIMEOUT_SECONDS") {
                let value: u64 = value_str.parse().map_err(|e| {
                    ConfigError::InvalidTimeout(format!(
                        "BBB_MOCK_REQUEST_TIMEOUT_SECONDS must be a valid positive integer, got '{}': {}",
                        value_str, e
                    ))
                })?;

                if value == 0 {
                    return Err(ConfigError::InvalidTimeout(
                        "BBB_MOCK_REQUEST_TIMEOUT_SECONDS must be greater than 0".to_string(),
                    ));
                }

                if value > MAX_REQUEST_TIMEOUT_SECONDS {
                    return Err(ConfigError::InvalidTimeout(format!(
                        "BBB_MOCK_REQUEST_TIMEOUT_SECONDS must not exceed {} seconds, got {}",
                        MAX_REQUEST_TIMEOUT_SECONDS, value
                    )));
                }

                value
            } else {
                DEFAULT_REQUEST_TIMEOUT_SECONDS
            };

        let origin = vars
            .get("BBB_FIXTURE_ORIGIN")
            .cloned()
            .unwrap_or_else(|| DEFAULT_ORIGIN.to_string());

        tracing::debug!(
            target: "bbb.fixtures.config",
            mock_server_url = %mock_server_url,
            request_timeout_seconds,
            "Fixture configuration loaded"
        );

        Ok(Config {
            mock_server_url: trim_trailing_slash(mock_server_url.clone()),
            site_url: trim_trailing_slash(site_url),
            request_timeout_seconds,
            origin,
        })
    }
}

fn validate_http_url(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidUrl(format!(
            "{} must be an http(s) URL, got '{}'",
            name, value
        )))
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}
