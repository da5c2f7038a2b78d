//! Command-line interface.
//!
//! Date and duration strings are parsed here; everything past this module
//! works with `DateTime<Utc>` and seconds.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};

use crate::config::ConfigError;
use crate::uptime::Period;

/// Download and analyse outage statistics from Uptime.com.
#[derive(Debug, Parser)]
#[command(name = "uptime-reporter", version, subcommand_required = true, arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch per-check outage stats and write them as CSV
    Download(DownloadArgs),
    /// Summarise and rank sites from CSV data
    Analyse(AnalyseArgs),
}

#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Start of the period (RFC 3339 or YYYY-MM-DD)
    #[arg(value_parser = parse_time)]
    pub start: DateTime<Utc>,

    /// End of the period (RFC 3339 or YYYY-MM-DD)
    #[arg(value_parser = parse_time)]
    pub end: DateTime<Utc>,

    /// Skip every check up to and including this ID
    #[arg(long, value_name = "CHECK_ID")]
    pub resume_after: Option<i64>,

    /// JSON site list whose IDs replace the account listing
    #[arg(long, value_name = "FILE")]
    pub sites: Option<PathBuf>,

    /// Append CSV here instead of standard output
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl DownloadArgs {
    /// The query period, checked for order.
    pub fn period(&self) -> Result<Period, ConfigError> {
        if self.start >= self.end {
            return Err(ConfigError::InvalidArgument(format!(
                "start {} is not before end {}",
                self.start, self.end
            )));
        }
        Ok(Period::new(self.start, self.end))
    }
}

#[derive(Debug, Args)]
pub struct AnalyseArgs {
    /// Read CSV from this file instead of standard input
    #[arg(long, short = 'i', value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Only report sites with at most this much downtime (e.g. "1h30m")
    #[arg(long, value_name = "DURATION", value_parser = parse_downtime)]
    pub max_downtime: Option<u64>,

    /// Write box plots for every group into this directory
    #[arg(long, value_name = "DIR")]
    pub plot_dir: Option<PathBuf>,
}

/// Parse an RFC 3339 timestamp, or a bare date meaning midnight UTC.
pub fn parse_time(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid date {:?}: expected RFC 3339 or YYYY-MM-DD", s))
}

/// Parse a human-readable duration into whole seconds.
pub fn parse_downtime(s: &str) -> Result<u64, String> {
    humantime::parse_duration(s)
        .map(|d| d.as_secs())
        .map_err(|e| format!("invalid duration {:?}: {}", s, e))
}
