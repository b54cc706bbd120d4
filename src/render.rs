//! HTML rendering of a [`Report`] and writing it to disk.
//!
//! The template carries all styling inline, so the rendered string is a
//! self-contained document.

use std::fs;
use std::path::{Path, PathBuf};

use askama::Template;

use crate::duration::format_duration;
use crate::error::ReportError;
use crate::metrics::CheckRow;
use crate::range::ReportRange;
use crate::report::Report;

const TH_STYLE: &str = "color:#fff;background-color:#222;border:1px solid #000;padding:5px 10px;\
font-size:12px;font-family:Arial,sans-serif;text-align:left;";
const TD_STYLE: &str = "color:#000;background-color:#fff;border:1px solid #ddd;padding:10px 10px;\
font-size:13px;font-family:Arial,sans-serif;";
const RESPONSE_BAR_COLOR: &str = "#00ff00";
const OUTAGE_BAR_COLOR: &str = "#ff4500";

#[derive(Template)]
#[template(path = "report.html")]
struct ReportPage {
    title: String,
    date_span: String,
    overview_heading: String,
    overview: OverviewCells,
    with_downtime: Vec<RowCells>,
    without_downtime: Vec<RowCells>,
    tags: String,
    th_style: &'static str,
    td_style: &'static str,
}

struct OverviewCells {
    uptime: String,
    outages: u64,
    downtime: String,
    response_time: String,
    check_count: usize,
}

struct RowCells {
    name: String,
    link: String,
    hostname: String,
    downtime: String,
    outages: u32,
    outage_bar: String,
    response_time: String,
    response_bar: String,
    uptime: String,
}

/// Column maxima the in-cell bars are scaled against.
struct BarScale {
    outages: f64,
    response_time: f64,
}

impl BarScale {
    fn of(rows: &[CheckRow]) -> Self {
        let outages = rows.iter().map(|r| r.metrics().outage_count).max().unwrap_or(0);
        let response_time = rows
            .iter()
            .filter_map(|r| r.metrics().response_time_ms)
            .fold(0.0, f64::max);
        Self {
            outages: f64::from(outages),
            response_time,
        }
    }
}

/// Share of `max` covered by `value`, in percent.
fn bar_width(value: f64, max: f64) -> f64 {
    if max > 0.0 {
        (value / max * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

fn bar_style(color: &str, width: f64) -> String {
    if width <= 0.0 {
        return String::new();
    }
    format!("background:linear-gradient(90deg, {color} {width:.1}%, transparent {width:.1}%);")
}

fn format_response(response_time_ms: Option<f64>) -> String {
    match response_time_ms {
        Some(ms) => format!("{ms:.0} ms"),
        None => "n/a".to_string(),
    }
}

/// Link to the check's uptime page on the monitoring dashboard.
fn check_link(check_id: u64, range: &ReportRange) -> String {
    let mut link = format!("https://my.pingdom.com/app/reports/uptime#check={check_id}");
    if let Some(days) = range.days {
        link.push_str(&format!("&daterange={days}days"));
    }
    link
}

fn row_cells(row: &CheckRow, range: &ReportRange, scale: &BarScale, uptime_precision: usize) -> RowCells {
    let check = row.check();
    let metrics = row.metrics();

    let mut uptime = format!("{:.*}%", uptime_precision, metrics.uptime_percent);
    if metrics.data_gap {
        uptime.push_str(" (no data)");
    }

    RowCells {
        name: check.name.clone(),
        link: check_link(check.id, range),
        hostname: check.hostname.clone(),
        downtime: format_duration(metrics.downtime_seconds),
        outages: metrics.outage_count,
        outage_bar: bar_style(
            OUTAGE_BAR_COLOR,
            bar_width(f64::from(metrics.outage_count), scale.outages),
        ),
        response_time: format_response(metrics.response_time_ms),
        response_bar: bar_style(
            RESPONSE_BAR_COLOR,
            bar_width(metrics.response_time_ms.unwrap_or(0.0), scale.response_time),
        ),
        uptime,
    }
}

impl From<&Report> for ReportPage {
    fn from(report: &Report) -> Self {
        let range = &report.range;
        let overview = &report.overview;

        let with_scale = BarScale::of(&report.checks_with_downtime);
        let without_scale = BarScale::of(&report.checks_without_downtime);

        ReportPage {
            title: format!("{} Uptime Report", range.label),
            date_span: range.date_span(),
            overview_heading: format!("OVERVIEW: {} - {}", report.report_name, range.label),
            overview: OverviewCells {
                uptime: format!("{:.3}%", overview.mean_uptime_percent),
                outages: overview.total_outages,
                downtime: overview.total_downtime.clone(),
                response_time: format_response(overview.mean_response_time_ms),
                check_count: overview.check_count,
            },
            with_downtime: report
                .checks_with_downtime
                .iter()
                .map(|row| row_cells(row, range, &with_scale, 3))
                .collect(),
            without_downtime: report
                .checks_without_downtime
                .iter()
                .map(|row| row_cells(row, range, &without_scale, 0))
                .collect(),
            tags: report.tags.iter().cloned().collect::<Vec<_>>().join(", "),
            th_style: TH_STYLE,
            td_style: TD_STYLE,
        }
    }
}

/// Renders the report as a self-contained HTML document.
pub fn render_html(report: &Report) -> Result<String, ReportError> {
    Ok(ReportPage::from(report).render()?)
}

/// Writes `html` to `output_dir/file_name`, creating the directory if needed.
///
/// # Returns
///
/// * `Ok(PathBuf)` with the path written
/// * `Err(ReportError::Io)` if the directory or file cannot be written
pub fn write_report(html: &str, output_dir: &Path, file_name: &str) -> Result<PathBuf, ReportError> {
    fs::create_dir_all(output_dir).map_err(|source| ReportError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let path = output_dir.join(file_name);
    fs::write(&path, html).map_err(|source| ReportError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
