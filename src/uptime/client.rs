//! HTTP client for the Uptime.com REST API.

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{site_from_check, ApiError, Check, CheckStats, Page, Period, RATE_LIMIT_MARKER};
use crate::site::Site;

/// Page size used when listing checks.
const LIST_PAGE_SIZE: u32 = 250;

/// Client for one Uptime.com account.
///
/// Requests are spaced at least `min_interval` apart.
pub struct UptimeClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl UptimeClient {
    /// Create a client for the API rooted at `base_url`.
    pub fn new(token: &str, base_url: &str, min_interval: Duration) -> Result<Self, ApiError> {
        if token.trim().is_empty() {
            return Err(ApiError::AuthConfig);
        }

        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| ApiError::Transport(format!("invalid API URL {:?}: {}", base_url, e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("uptime-reporter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            token: token.to_string(),
            min_interval,
            last_request: Mutex::new(None),
        })
    }

    /// List the IDs of every check in the account, following pagination.
    pub async fn list_site_ids(&self) -> Result<Vec<i64>, ApiError> {
        let mut url = self.endpoint("checks/")?;
        url.query_pairs_mut()
            .append_pair("page_size", &LIST_PAGE_SIZE.to_string());

        let mut ids = Vec::new();
        loop {
            let page: Page<Check> = self.get_json(url).await?;
            tracing::debug!("Listed {} of {} checks", ids.len() + page.results.len(), page.count);
            ids.extend(page.results.iter().map(|c| c.pk));

            match page.next {
                Some(next) => {
                    url = Url::parse(&next).map_err(|e| {
                        ApiError::Decode(format!("invalid next page URL {:?}: {}", next, e))
                    })?;
                }
                None => break,
            }
        }

        Ok(ids)
    }

    /// Get the metadata for one check.
    pub async fn get_check(&self, id: i64) -> Result<Check, ApiError> {
        let url = self.endpoint(&format!("checks/{}/", id))?;
        self.get_json(url).await
    }

    /// Get the outage totals for one check over `period`.
    pub async fn get_check_stats(&self, id: i64, period: &Period) -> Result<CheckStats, ApiError> {
        let mut url = self.endpoint(&format!("checks/{}/stats/", id))?;
        url.query_pairs_mut()
            .append_pair("start_date", &period.start_param())
            .append_pair("end_date", &period.end_param());
        self.get_json(url).await
    }

    /// Fetch one check's metadata and period stats as a site.
    pub async fn fetch_stats(&self, id: i64, period: &Period) -> Result<Site, ApiError> {
        let stats = self.get_check_stats(id, period).await?;
        let check = self.get_check(id).await?;
        Ok(site_from_check(check, &stats))
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::Transport(format!("invalid endpoint {:?}: {}", path, e)))
    }

    /// Wait until `min_interval` has passed since the previous request.
    async fn pace(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        self.pace().await;
        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(url.clone())
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .send()
            .await
            .map_err(|e| ApiError::Transport(format!("GET {}: {}", url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(format!("GET {}: {}", url, e)))?;

        if !status.is_success() {
            if status == StatusCode::TOO_MANY_REQUESTS || body.contains(RATE_LIMIT_MARKER) {
                return Err(ApiError::RateLimited(format!("GET {}: {} {}", url, status, body)));
            }
            return Err(ApiError::Transport(format!("GET {}: {} {}", url, status, body)));
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode(format!("GET {}: {}", url, e)))
    }
}
