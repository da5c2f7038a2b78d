//! Uptime.com API client.
//!
//! Lists the checks in an account and fetches per-check outage statistics,
//! with a rate-limit aware retry loop around the fetch.

mod client;
mod models;
mod retry;

pub use client::*;
pub use models::*;
pub use retry::*;

use thiserror::Error;

/// Marker the service puts in the body of a rate-limited response.
pub const RATE_LIMIT_MARKER: &str = "API_RATE_LIMIT";

/// API error types.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API token must not be empty")]
    AuthConfig,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("cancelled")]
    Cancelled,
}

impl ApiError {
    /// Whether this failure only signals request-rate exhaustion.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::RateLimited(_))
    }
}
