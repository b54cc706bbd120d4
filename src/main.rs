//! Pingdom Uptime Report
//!
//! This tool builds an HTML uptime report for the Pingdom checks carrying a
//! set of tags, covering either the previous calendar month or the last
//! `n` days.

mod api;
mod config;
mod duration;
mod error;
mod metrics;
mod range;
mod render;
mod report;

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use dotenv::dotenv;
use tracing::info;

use crate::api::PingdomApi;
use crate::config::{parse_timeout_secs, ReportConfig};
use crate::error::ReportError;
use crate::metrics::collect_metrics;
use crate::range::{resolve_range, ReportRange};
use crate::render::{render_html, write_report};
use crate::report::{build_report, Report};

/// Exit code used when the tag filter matches no checks.
const NO_CHECKS_EXIT_CODE: u8 = 2;

/// Command line arguments for the Pingdom uptime report
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Cover the previous DAYS days instead of the previous calendar month
    #[arg(short, long, value_name = "DAYS")]
    days: Option<u32>,

    /// Comma separated list of check tags
    #[arg(
        short,
        long,
        value_name = "TAGS",
        value_delimiter = ',',
        default_value = "bug_bounty_site"
    )]
    tags: Vec<String>,

    /// Label shown in the report overview
    #[arg(short, long, default_value = "Critical Sites Monthly Uptime")]
    report_name: String,

    /// Directory the report is written to (overrides PINGDOM_REPORT_DIR)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Per-request timeout in seconds (overrides PINGDOM_REQUEST_TIMEOUT_SECS)
    #[arg(long, value_name = "SECS", value_parser = parse_timeout_secs)]
    timeout: Option<Duration>,

    /// Number of checks whose summaries are fetched concurrently
    #[arg(short, long, default_value_t = 1, value_parser = parse_concurrency)]
    concurrency: usize,
}

/// Parses a concurrency level, which must be at least 1
fn parse_concurrency(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("concurrency must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Trims tags, drops empty entries and duplicates, keeping first-seen order
fn normalize_tags(tags: Vec<String>) -> Result<Vec<String>, ReportError> {
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !normalized.iter().any(|t| t == tag) {
            normalized.push(tag.to_string());
        }
    }

    if normalized.is_empty() {
        return Err(ReportError::Config("at least one tag is required".to_string()));
    }
    Ok(normalized)
}

/// Fetches the tagged checks and their metrics and assembles the report
///
/// # Returns
///
/// * `Ok(Report)` on success
/// * `Err(ReportError::NoChecksFound)` if no check carries any of `tags`
/// * `Err` for the first failed API request
async fn generate_report(
    api: &PingdomApi,
    range: ReportRange,
    tags: &[String],
    report_name: &str,
    concurrency: usize,
) -> Result<Report, ReportError> {
    let checks = api.fetch_checks(tags).await?;
    info!(count = checks.len(), tags = %tags.join(","), "Fetched checks");

    let rows = collect_metrics(api, checks, &range, concurrency).await?;
    build_report(rows, range, tags, report_name)
}

/// Runs one report with `config` as loaded from the environment
///
/// Command line flags override `config` before anything is fetched.
///
/// # Returns
///
/// * `Ok(ExitCode::SUCCESS)` once the report is written
/// * `Ok(ExitCode::from(2))` if no checks match the tags, without writing a file
/// * `Err` describing any other failure
async fn run(args: Args, mut config: ReportConfig) -> Result<ExitCode, Box<dyn Error>> {
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    if let Some(timeout) = args.timeout {
        config.request_timeout = timeout;
    }
    config.concurrency = args.concurrency;

    let tags = normalize_tags(args.tags)?;
    let range = resolve_range(args.days, Utc::now())?;

    info!(
        from = %range.from.format("%Y-%m-%d %H:%M:%S"),
        to = %range.to.format("%Y-%m-%d %H:%M:%S"),
        label = %range.label,
        "Generating uptime report"
    );

    let api = PingdomApi::new(&config)?;
    let report = match generate_report(&api, range, &tags, &args.report_name, config.concurrency).await {
        Ok(report) => report,
        Err(err @ ReportError::NoChecksFound { .. }) => {
            println!("{err}");
            return Ok(ExitCode::from(NO_CHECKS_EXIT_CODE));
        }
        Err(err) => return Err(err.into()),
    };

    let html = render_html(&report)?;
    let path = write_report(&html, &config.output_dir, &report.range.file_name())?;

    info!(
        path = %path.display(),
        checks = report.overview.check_count,
        outages = report.overview.total_outages,
        downtime_seconds = report.overview.total_downtime_seconds,
        "Report written"
    );

    Ok(ExitCode::SUCCESS)
}

/// Main entry point for the Pingdom uptime report
///
/// This function:
/// 1. Loads configuration from the environment and command line
/// 2. Resolves the reporting window
/// 3. Fetches tagged checks and per-check summaries from Pingdom
/// 4. Renders the report and writes it to the output directory
#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    dotenv().ok(); // Load .env file if it exists
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let config = ReportConfig::from_env()?;
    run(args, config).await
}
