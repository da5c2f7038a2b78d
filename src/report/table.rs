//! Worst-offender ranking table.

use std::io::{self, Write};

use tabled::settings::{Padding, Style};
use tabled::{Table, Tabled};

use super::WORST_LIMIT;
use crate::site::{Site, SiteSet};

/// One line of the ranking table.
#[derive(Tabled)]
struct WorstRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Outages")]
    outages: u64,
    #[tabled(rename = "Downtime")]
    downtime: String,
}

/// Rank the first `limit` sites that had at least one outage.
///
/// `sites` must already be sorted by downtime. Sites without outages are
/// skipped and do not use up a rank.
pub fn worst_offenders(sites: &SiteSet, limit: usize) -> Vec<(usize, &Site)> {
    sites
        .iter()
        .filter(|s| s.outages > 0)
        .take(limit)
        .enumerate()
        .map(|(i, s)| (i + 1, s))
        .collect()
}

/// Write the ranking table for already-sorted `sites`.
pub fn write_worst<W: Write>(sites: &SiteSet, out: &mut W) -> io::Result<()> {
    writeln!(out, "Sites with most downtime:")?;

    let rows = worst_offenders(sites, WORST_LIMIT)
        .into_iter()
        .map(|(rank, site)| WorstRow {
            rank,
            name: site.name.clone(),
            url: site.url.clone(),
            outages: site.outages,
            downtime: format_duration(site.downtime_secs),
        });

    // Borderless, two spaces between columns, nothing after the last one.
    let table = Table::new(rows)
        .with(Style::empty())
        .with(Padding::new(0, 2, 0, 0))
        .to_string();
    for line in table.lines() {
        writeln!(out, "{}", line.trim_end())?;
    }
    writeln!(out)?;
    Ok(())
}

/// Format whole seconds the way Go prints a `time.Duration`, e.g. `1m57s`.
pub fn format_duration(secs: u64) -> String {
    let (hours, minutes, seconds) = (secs / 3600, secs % 3600 / 60, secs % 60);
    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(3), "3s");
        assert_eq!(format_duration(117), "1m57s");
        assert_eq!(format_duration(3600), "1h0m0s");
        assert_eq!(format_duration(90061), "25h1m1s");
    }

    #[test]
    fn test_zero_outage_sites_never_ranked() {
        let mut sites: SiteSet = vec![
            Site::new("Silent but down", "", "A", 0, 10_000),
            Site::new("Flaky", "", "A", 3, 50),
            Site::new("Quiet", "", "A", 0, 0),
        ]
        .into();
        sites.sort_by_downtime();

        let ranked = worst_offenders(&sites, WORST_LIMIT);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].0, 1);
        assert_eq!(ranked[0].1.name, "Flaky");
    }

    #[test]
    fn test_ranking_stops_at_limit() {
        let mut sites: SiteSet = (0..25u64)
            .map(|i| Site::new(&format!("site{:02}", i), "", "A", i % 3, i * 10))
            .collect();
        sites.sort_by_downtime();

        let ranked = worst_offenders(&sites, WORST_LIMIT);
        assert_eq!(ranked.len(), 10);
        assert!(ranked.iter().all(|(_, s)| s.outages > 0));
        let ranks: Vec<usize> = ranked.iter().map(|(r, _)| *r).collect();
        assert_eq!(ranks, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_write_worst() {
        let sites: SiteSet = vec![
            Site::new("Daily Planet", "https://dailyplanet.com", "News", 6, 117),
            Site::new("Bank", "https://bank.com", "Finance", 1, 3),
        ]
        .into();

        let mut out = Vec::new();
        write_worst(&sites, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Sites with most downtime:\n\
             Rank  Name          URL                      Outages  Downtime\n\
             1     Daily Planet  https://dailyplanet.com  6        1m57s\n\
             2     Bank          https://bank.com         1        3s\n\
             \n"
        );
    }

    #[test]
    fn test_write_worst_without_outages() {
        let sites: SiteSet = vec![Site::new("Quiet", "https://quiet.example", "A", 0, 0)].into();

        let mut out = Vec::new();
        write_worst(&sites, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Sites with most downtime:\nRank  Name  URL  Outages  Downtime\n\n"
        );
    }

    #[test]
    fn test_write_worst_large_counts() {
        let sites: SiteSet =
            vec![Site::new("Big", "https://big.example", "Ops", 5_000_000_000, 90061)].into();

        let mut out = Vec::new();
        write_worst(&sites, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let row = text.lines().nth(2).unwrap();
        assert_eq!(row, "1     Big   https://big.example  5000000000  25h1m1s");
    }
}
