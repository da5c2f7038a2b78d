//! Collector that downloads per-check statistics one check at a time.

use std::io::Write;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::site::{write_site, CodecError, Site, SiteSet};
use crate::uptime::{retry_rate_limited, ApiError, Backoff, Period, Sleeper, TokioSleeper, UptimeClient};

/// Collector error types.
#[derive(Error, Debug)]
pub enum CollectError {
    #[error("check {id}: {source}")]
    Fetch { id: i64, source: ApiError },
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("writing output: {0}")]
    Output(#[from] CodecError),
}

/// Drop every ID up to and including `after`.
///
/// When `after` is not in the list, the whole list is returned.
pub fn resume_after(ids: &[i64], after: i64) -> &[i64] {
    match ids.iter().position(|&id| id == after) {
        Some(i) => &ids[i + 1..],
        None => {
            tracing::warn!("Resume ID {} not found; fetching all {} checks", after, ids.len());
            ids
        }
    }
}

/// Sequential downloader for a list of checks.
pub struct Collector<'a, S = TokioSleeper> {
    client: &'a UptimeClient,
    backoff: Backoff,
    sleeper: S,
    cancel: CancellationToken,
}

impl<'a> Collector<'a, TokioSleeper> {
    pub fn new(client: &'a UptimeClient, backoff: Backoff, cancel: CancellationToken) -> Self {
        Self {
            client,
            backoff,
            sleeper: TokioSleeper,
            cancel,
        }
    }
}

impl<'a, S: Sleeper> Collector<'a, S> {
    /// Replace the sleeper used between rate-limited attempts.
    #[cfg(test)]
    pub fn with_sleeper<T: Sleeper>(self, sleeper: T) -> Collector<'a, T> {
        Collector {
            client: self.client,
            backoff: self.backoff,
            sleeper,
            cancel: self.cancel,
        }
    }

    /// IDs to collect: taken from `seed` in file order when a static site list
    /// is given, otherwise listed from the account.
    pub async fn site_ids(&self, seed: Option<&SiteSet>) -> Result<Vec<i64>, CollectError> {
        if let Some(sites) = seed {
            return Ok(sites.iter().filter_map(|s| s.id).collect());
        }

        let ids = retry_rate_limited(&self.backoff, &self.sleeper, &self.cancel, || {
            self.client.list_site_ids()
        })
        .await?;
        tracing::info!("Found {} checks in account", ids.len());
        Ok(ids)
    }

    /// Fetch one check, waiting out rate limits.
    pub async fn fetch_site(&self, id: i64, period: &Period) -> Result<Site, ApiError> {
        retry_rate_limited(&self.backoff, &self.sleeper, &self.cancel, || {
            self.client.fetch_stats(id, period)
        })
        .await
    }

    /// Fetch every check in `ids`, in order, writing each site to `out` as
    /// soon as it arrives.
    ///
    /// The first error that is not a rate limit ends the run; sites already
    /// written stay in the output.
    pub async fn run<W: Write>(
        &self,
        ids: &[i64],
        period: &Period,
        out: &mut W,
    ) -> Result<usize, CollectError> {
        tracing::info!("Collecting stats for {} checks", ids.len());

        for (i, &id) in ids.iter().enumerate() {
            let site = self
                .fetch_site(id, period)
                .await
                .map_err(|source| CollectError::Fetch { id, source })?;

            tracing::info!(
                "Collector: [{}/{}] {} ({} outages, {}s down)",
                i + 1,
                ids.len(),
                site.name,
                site.outages,
                site.downtime_secs
            );
            write_site(&mut *out, &site)?;
        }

        Ok(ids.len())
    }
}
