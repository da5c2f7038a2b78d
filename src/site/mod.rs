//! Site records and the operations reports run over them.
//!
//! Provides the `Site` model, the CSV codec for the intermediate file
//! format, and the static site-list loader.

mod codec;
mod list;
mod set;

pub use codec::*;
pub use list::*;
pub use set::*;

use thiserror::Error;

/// Codec error types.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("data line {record}: {reason}")]
    Format { record: String, reason: String },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("site list error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    fn format(record: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Format {
            record: record.into(),
            reason: reason.into(),
        }
    }
}

/// A monitored site plus its outage metrics for one query period.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Site {
    /// Check ID issued by the monitoring service. Not part of the CSV format.
    pub id: Option<i64>,
    pub name: String,
    pub url: String,
    pub sector: String,
    pub outages: u64,
    pub downtime_secs: u64,
}

impl Site {
    pub fn new(name: &str, url: &str, sector: &str, outages: u64, downtime_secs: u64) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            url: url.to_string(),
            sector: sector.to_string(),
            outages,
            downtime_secs,
        }
    }
}
