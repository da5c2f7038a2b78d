//! Configuration module for uptime-reporter.
//!
//! Loads configuration from environment variables. The API token is
//! required; everything else has a default.

use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::uptime::Backoff;

/// Environment variable carrying the API token.
pub const TOKEN_VAR: &str = "UPTIME_API_TOKEN";

/// Configuration error types.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no {0} set")]
    MissingToken(&'static str),
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Reporter configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReporterConfig {
    /// API token for the monitoring service
    pub api_token: String,
    /// Base URL of the REST API (default: "https://uptime.com/api/v1/")
    pub api_url: String,
    /// Minimum spacing between API requests (default: 8s)
    pub request_interval: Duration,
    /// Backoff between rate-limited attempts (default: exponential 5s..10m)
    pub backoff: Backoff,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            api_url: "https://uptime.com/api/v1/".to_string(),
            request_interval: Duration::from_millis(8000),
            backoff: Backoff::default(),
        }
    }
}

impl ReporterConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `UPTIME_API_TOKEN`: API token (required)
    /// - `UPTIME_API_URL`: API base URL (default: "https://uptime.com/api/v1/")
    /// - `UPTIME_RATE_MS`: minimum milliseconds between requests (default: 8000)
    /// - `UPTIME_BACKOFF`: "exponential" or "fixed" (default: "exponential")
    /// - `UPTIME_BACKOFF_BASE_SECS`: first or fixed backoff delay (default: 5)
    /// - `UPTIME_BACKOFF_MAX_SECS`: exponential backoff ceiling (default: 600)
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration using `lookup` to resolve variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        cfg.api_token = lookup(TOKEN_VAR)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingToken(TOKEN_VAR))?;

        if let Some(url) = lookup("UPTIME_API_URL") {
            cfg.api_url = url;
        }

        if let Some(ms) = lookup("UPTIME_RATE_MS") {
            cfg.request_interval = Duration::from_millis(parse_number("UPTIME_RATE_MS", &ms)?);
        }

        let base = match lookup("UPTIME_BACKOFF_BASE_SECS") {
            Some(s) => Duration::from_secs(parse_number("UPTIME_BACKOFF_BASE_SECS", &s)?),
            None => Duration::from_secs(5),
        };
        let max = match lookup("UPTIME_BACKOFF_MAX_SECS") {
            Some(s) => Duration::from_secs(parse_number("UPTIME_BACKOFF_MAX_SECS", &s)?),
            None => Duration::from_secs(600),
        };
        if max < base {
            return Err(ConfigError::Invalid {
                var: "UPTIME_BACKOFF_MAX_SECS",
                reason: format!("ceiling {}s is below base delay {}s", max.as_secs(), base.as_secs()),
            });
        }

        cfg.backoff = match lookup("UPTIME_BACKOFF").as_deref() {
            None | Some("exponential") => Backoff::Exponential { base, max },
            Some("fixed") => Backoff::Fixed(base),
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "UPTIME_BACKOFF",
                    reason: format!("unknown strategy {:?}", other),
                })
            }
        };

        Ok(cfg)
    }
}

fn parse_number(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|e| ConfigError::Invalid {
        var,
        reason: format!("{:?}: {}", value, e),
    })
}
