//! uptime-reporter - Uptime.com outage reporting
//!
//! Downloads per-check outage statistics for a period as CSV, and turns that
//! CSV into per-sector summaries and worst-offender rankings.

mod cli;
mod collector;
mod config;
mod report;
mod site;
mod stats;
mod uptime;

use cli::{AnalyseArgs, Cli, Command, DownloadArgs};
use collector::{resume_after, Collector};
use config::ReporterConfig;
use report::ReportOptions;
use uptime::UptimeClient;

use clap::Parser;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Write};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging; stdout carries CSV and reports
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("uptime_reporter=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Download(args) => download(args).await,
        Command::Analyse(args) => analyse(args),
    }
}

async fn download(args: DownloadArgs) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Validate everything before the first request
    let cfg = ReporterConfig::load()?;
    let period = args.period()?;
    let seed = match &args.sites {
        Some(path) => Some(site::load_site_list_file(path)?),
        None => None,
    };

    let client = UptimeClient::new(&cfg.api_token, &cfg.api_url, cfg.request_interval)?;
    tracing::info!(
        "Downloading stats from {} to {}",
        period.start_param(),
        period.end_param()
    );

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted; stopping after the current request");
            ctrl_c.cancel();
        }
    });

    let collector = Collector::new(&client, cfg.backoff, cancel);
    let ids = collector.site_ids(seed.as_ref()).await?;
    let ids = match args.resume_after {
        Some(after) => resume_after(&ids, after),
        None => &ids[..],
    };

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(OpenOptions::new().create(true).append(true).open(path)?),
        None => Box::new(io::stdout().lock()),
    };
    let count = collector.run(ids, &period, &mut out).await?;
    tracing::info!("Downloaded {} sites", count);

    Ok(())
}

fn analyse(args: AnalyseArgs) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let opts = ReportOptions {
        max_downtime: args.max_downtime,
        plot_dir: args.plot_dir,
    };

    let mut out = io::stdout().lock();
    match &args.input {
        Some(path) => report::analyse(BufReader::new(File::open(path)?), &opts, &mut out)?,
        None => report::analyse(io::stdin().lock(), &opts, &mut out)?,
    }

    Ok(())
}
