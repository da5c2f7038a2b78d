//! Report driver.
//!
//! Groups sites by sector and prints, for every sector and then for all
//! sites together, outage and downtime summaries followed by a ranking of the
//! worst offenders.

mod plot;
mod table;

pub use plot::*;
pub use table::*;

use std::io::{Read, Write};
use std::path::PathBuf;

use thiserror::Error;

use crate::site::{read_sites, CodecError, SiteSet};
use crate::stats::{summarize, StatsError};

/// Name of the pseudo-sector covering every site.
pub const ALL_SECTORS: &str = "All";

/// Number of rows in a worst-offender ranking.
pub const WORST_LIMIT: usize = 10;

/// Report error types.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("reading sites: {0}")]
    Input(#[from] CodecError),
    #[error("summary: {0}")]
    Stats(#[from] StatsError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Options for one report run.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Drop sites with more downtime than this many seconds
    pub max_downtime: Option<u64>,
    /// Write box plots into this directory
    pub plot_dir: Option<PathBuf>,
}

/// Read CSV sites from `input` and write the full report to `out`.
pub fn analyse<R: Read, W: Write>(
    input: R,
    opts: &ReportOptions,
    out: &mut W,
) -> Result<(), ReportError> {
    let sites = read_sites(input)?;
    tracing::info!("Read {} sites", sites.len());
    write_report(&sites, opts, out)
}

/// Write the report for `sites`.
pub fn write_report<W: Write>(
    sites: &SiteSet,
    opts: &ReportOptions,
    out: &mut W,
) -> Result<(), ReportError> {
    let sites = match opts.max_downtime {
        Some(limit) => {
            let filtered = sites.filter_downtime_over(limit);
            tracing::info!(
                "Kept {} of {} sites with at most {}s downtime",
                filtered.len(),
                sites.len(),
                limit
            );
            filtered
        }
        None => sites.clone(),
    };

    for (sector, group) in sites.by_sector() {
        write_section(&sector, group, opts, out)?;
    }
    write_section(ALL_SECTORS, sites, opts, out)?;

    out.flush()?;
    Ok(())
}

fn write_section<W: Write>(
    sector: &str,
    mut sites: SiteSet,
    opts: &ReportOptions,
    out: &mut W,
) -> Result<(), ReportError> {
    writeln!(out, "Sector: {} ({} sites)", sector, sites.len())?;
    if sites.is_empty() {
        tracing::warn!("Sector {}: no sites to summarise", sector);
        writeln!(out, "No sites to summarise.")?;
        writeln!(out)?;
        return Ok(());
    }

    let outages = sites.outages();
    writeln!(out, "Outages: {}", summarize(&outages)?)?;
    let downtimes = sites.downtimes();
    writeln!(out, "Downtimes: {}", summarize(&downtimes)?)?;
    writeln!(out)?;

    if let Some(dir) = &opts.plot_dir {
        for (metric, values) in [("Outages", &outages), ("Downtimes", &downtimes)] {
            let path = write_box_plot(dir, sector, metric, values)?;
            tracing::debug!("Wrote {}", path.display());
        }
    }

    sites.sort_by_downtime();
    write_worst(&sites, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::Site;

    fn sites() -> SiteSet {
        vec![
            Site::new("Wakandan Airlines", "https://wakandanairlines.com", "Travel", 4, 117),
            Site::new("Bank of Metropolis", "https://bankofmetropolis.com", "Financial Services", 1, 3),
            Site::new("Daily Planet", "https://dailyplanet.com", "News & Media", 6, 117),
            Site::new("Gotham Air", "https://gothamair.com", "Travel", 0, 0),
        ]
        .into()
    }

    fn report(opts: &ReportOptions) -> String {
        let mut out = Vec::new();
        write_report(&sites(), opts, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_sections_in_order() {
        let text = report(&ReportOptions::default());
        let headers: Vec<&str> = text.lines().filter(|l| l.starts_with("Sector: ")).collect();
        assert_eq!(
            headers,
            vec![
                "Sector: Financial Services (1 sites)",
                "Sector: News & Media (1 sites)",
                "Sector: Travel (2 sites)",
                "Sector: All (4 sites)",
            ]
        );
    }

    #[test]
    fn test_travel_section() {
        let text = report(&ReportOptions::default());
        let start = text.find("Sector: Travel").unwrap();
        let end = text.find("Sector: All").unwrap();
        let section = &text[start..end];

        assert!(section.contains(
            "Outages: Total 4.0 Min 0.0 Max 4.0 Median 2.0 Mean 2.0 Standard deviation 2.0"
        ));
        assert!(section.contains(
            "Downtimes: Total 117.0 Min 0.0 Max 117.0 Median 58.5 Mean 58.5 Standard deviation 58.5"
        ));
        // Gotham Air had no outages, so it never takes a rank.
        assert!(section.contains("1     Wakandan Airlines"));
        assert!(!section.contains("Gotham Air"));
    }

    #[test]
    fn test_all_section_ranking() {
        let text = report(&ReportOptions::default());
        let all = &text[text.find("Sector: All").unwrap()..];
        let ranked: Vec<&str> = all
            .lines()
            .skip_while(|l| !l.starts_with("Rank"))
            .skip(1)
            .take_while(|l| !l.is_empty())
            .collect();

        assert_eq!(ranked.len(), 3);
        assert!(ranked[0].starts_with("1     Daily Planet"));
        assert!(ranked[1].starts_with("2     Wakandan Airlines"));
        assert!(ranked[2].starts_with("3     Bank of Metropolis"));
        assert!(ranked[0].ends_with("1m57s"));
    }

    #[test]
    fn test_downtime_ceiling() {
        let text = report(&ReportOptions {
            max_downtime: Some(10),
            ..Default::default()
        });
        assert!(text.contains("Sector: All (2 sites)"));
        assert!(!text.contains("Daily Planet"));
        assert!(!text.contains("Sector: News & Media"));
    }

    #[test]
    fn test_everything_filtered_out() {
        let mut out = Vec::new();
        let opts = ReportOptions::default();
        write_report(&SiteSet::new(), &opts, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "Sector: All (0 sites)\nNo sites to summarise.\n\n");
    }

    #[test]
    fn test_analyse_reads_csv() {
        let csv = "Wakandan Airlines,https://wakandanairlines.com,Travel,4,117\n";
        let mut out = Vec::new();
        analyse(csv.as_bytes(), &ReportOptions::default(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Sector: Travel (1 sites)\n"));
    }

    #[test]
    fn test_analyse_rejects_bad_csv() {
        let mut out = Vec::new();
        let result = analyse("Broken,https://x,Travel\n".as_bytes(), &ReportOptions::default(), &mut out);
        assert!(matches!(result, Err(ReportError::Input(CodecError::Format { .. }))));
    }

    #[test]
    fn test_plots_written() {
        let dir = tempfile::tempdir().unwrap();
        let opts = ReportOptions {
            plot_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        report(&opts);

        for name in [
            "Travel_Outages.svg",
            "Travel_Downtimes.svg",
            "News & Media_Outages.svg",
            "All_Downtimes.svg",
        ] {
            assert!(dir.path().join(name).exists(), "missing {}", name);
        }
    }
}
