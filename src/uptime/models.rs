//! Wire types for the Uptime.com REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::site::Site;

/// Timestamp format the stats endpoint expects.
pub const API_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A single monitored check.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Check {
    pub pk: i64,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "msp_address", default)]
    pub address: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: u64,
    pub next: Option<String>,
    #[serde(default)]
    pub results: Vec<T>,
}

/// Totals section of a check stats response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckStatsTotals {
    #[serde(default)]
    pub outages: u64,
    #[serde(default)]
    pub downtime_secs: u64,
}

/// Check stats response for a date range.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckStats {
    #[serde(default)]
    pub totals: CheckStatsTotals,
}

/// Query period for stats requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn start_param(&self) -> String {
        self.start.format(API_TIME_FORMAT).to_string()
    }

    pub fn end_param(&self) -> String {
        self.end.format(API_TIME_FORMAT).to_string()
    }
}

/// Merge check metadata and period stats into a site.
///
/// Only the first tag is kept as the sector.
pub fn site_from_check(check: Check, stats: &CheckStats) -> Site {
    Site {
        id: Some(check.pk),
        name: check.name,
        url: check.address,
        sector: check.tags.into_iter().next().unwrap_or_default(),
        outages: stats.totals.outages,
        downtime_secs: stats.totals.downtime_secs,
    }
}
