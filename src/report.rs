//! Report model assembled from the per-check rows.

use std::collections::BTreeSet;

use crate::duration::format_duration;
use crate::error::ReportError;
use crate::metrics::CheckRow;
use crate::range::ReportRange;

/// Aggregates over every check in the run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOverview {
    pub check_count: usize,
    /// Mean over all checks, data-gap fallbacks included
    pub mean_uptime_percent: f64,
    pub total_outages: u64,
    /// Mean over the checks that reported a response time; `None` if none did
    pub mean_response_time_ms: Option<f64>,
    pub total_downtime_seconds: u64,
    /// `total_downtime_seconds` as `Hh Mm Ss`
    pub total_downtime: String,
}

impl ReportOverview {
    fn from_rows(rows: &[CheckRow]) -> Self {
        let check_count = rows.len();
        let uptime_sum: f64 = rows.iter().map(|r| r.metrics().uptime_percent).sum();
        let total_outages: u64 = rows.iter().map(|r| u64::from(r.metrics().outage_count)).sum();
        let total_downtime_seconds: u64 = rows.iter().map(|r| r.metrics().downtime_seconds).sum();

        let response_times: Vec<f64> = rows.iter().filter_map(|r| r.metrics().response_time_ms).collect();
        let mean_response_time_ms = if response_times.is_empty() {
            None
        } else {
            Some(response_times.iter().sum::<f64>() / response_times.len() as f64)
        };

        Self {
            check_count,
            mean_uptime_percent: uptime_sum / check_count as f64,
            total_outages,
            mean_response_time_ms,
            total_downtime_seconds,
            total_downtime: format_duration(total_downtime_seconds),
        }
    }
}

/// Everything the renderer needs for one report.
#[derive(Debug, Clone)]
pub struct Report {
    pub range: ReportRange,
    /// Free-text label shown in the overview heading
    pub report_name: String,
    pub overview: ReportOverview,
    /// Checks with at least one outage, most outages first
    pub checks_with_downtime: Vec<CheckRow>,
    /// Checks without outages, by name
    pub checks_without_downtime: Vec<CheckRow>,
    pub tags: BTreeSet<String>,
}

/// Builds the report model from fully computed rows.
///
/// Rows are split on `outage_count`: rows with outages are ordered by
/// outage count descending (ties keep input order), the rest by name.
/// The overview always covers both partitions.
///
/// # Returns
///
/// * `Ok(Report)` on success
/// * `Err(ReportError::NoChecksFound)` if `rows` is empty
pub fn build_report(
    rows: Vec<CheckRow>,
    range: ReportRange,
    tags: &[String],
    report_name: &str,
) -> Result<Report, ReportError> {
    if rows.is_empty() {
        return Err(ReportError::NoChecksFound {
            tags: tags.to_vec(),
        });
    }

    let overview = ReportOverview::from_rows(&rows);

    let (mut checks_with_downtime, mut checks_without_downtime): (Vec<_>, Vec<_>) =
        rows.into_iter().partition(|r| r.metrics().outage_count != 0);
    checks_with_downtime.sort_by(|a, b| b.metrics().outage_count.cmp(&a.metrics().outage_count));
    checks_without_downtime.sort_by(|a, b| a.check().name.cmp(&b.check().name));

    Ok(Report {
        range,
        report_name: report_name.to_string(),
        overview,
        checks_with_downtime,
        checks_without_downtime,
        tags: tags.iter().cloned().collect(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::Check;
    use crate::metrics::CheckMetrics;
    use crate::range::resolve_range;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    pub(crate) fn row(id: u64, name: &str, outages: u32, downtime: u64, uptime: f64, response: Option<f64>) -> CheckRow {
        CheckRow::new(
            Check {
                id,
                name: name.to_string(),
                hostname: format!("{id}.example.com"),
                status: "up".to_string(),
            },
            CheckMetrics {
                downtime_seconds: downtime,
                outage_count: outages,
                response_time_ms: response,
                uptime_percent: uptime,
                data_gap: false,
            },
        )
    }

    pub(crate) fn range() -> ReportRange {
        resolve_range(Some(30), Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()).unwrap()
    }

    fn tags() -> Vec<String> {
        vec!["bug_bounty_site".to_string()]
    }

    fn ids(rows: &[CheckRow]) -> Vec<u64> {
        rows.iter().map(|r| r.check().id).collect()
    }

    #[test]
    fn test_partitions_and_orders() {
        let rows = vec![
            row(1, "zeta", 0, 0, 100.0, Some(100.0)),
            row(2, "alpha", 1, 60, 99.0, Some(200.0)),
            row(3, "beta", 0, 0, 100.0, Some(300.0)),
            row(4, "gamma", 3, 600, 98.0, Some(400.0)),
            row(5, "delta", 1, 30, 99.5, Some(500.0)),
        ];
        let report = build_report(rows, range(), &tags(), "Critical Sites").unwrap();

        assert_eq!(ids(&report.checks_with_downtime), vec![4, 2, 5]);
        assert_eq!(ids(&report.checks_without_downtime), vec![3, 1]);
    }

    #[test]
    fn test_overview_covers_all_checks() {
        let rows = vec![
            row(1, "a", 2, 3600, 99.0, Some(100.0)),
            row(2, "b", 0, 0, 100.0, Some(300.0)),
            row(3, "c", 1, 125, 98.0, None),
        ];
        let report = build_report(rows, range(), &tags(), "Critical Sites").unwrap();
        let overview = &report.overview;

        assert_eq!(overview.check_count, 3);
        assert_eq!(overview.total_outages, 3);
        assert_eq!(overview.total_downtime_seconds, 3725);
        assert_eq!(overview.total_downtime, "1h 2m 5s");
        assert!((overview.mean_uptime_percent - 99.0).abs() < 1e-9);
        assert_eq!(overview.mean_response_time_ms, Some(200.0));
        assert_eq!(report.report_name, "Critical Sites");
        assert!(report.tags.contains("bug_bounty_site"));
    }

    #[test]
    fn test_no_response_samples() {
        let rows = vec![row(1, "a", 0, 0, 100.0, None)];
        let report = build_report(rows, range(), &tags(), "r").unwrap();
        assert_eq!(report.overview.mean_response_time_ms, None);
    }

    #[test]
    fn test_empty_rows_is_no_checks_found() {
        let err = build_report(Vec::new(), range(), &tags(), "r").unwrap_err();
        assert!(matches!(err, ReportError::NoChecksFound { .. }));
    }

    #[test]
    fn test_tags_are_deduplicated() {
        let tags = vec!["web".to_string(), "api".to_string(), "web".to_string()];
        let report = build_report(vec![row(1, "a", 0, 0, 100.0, None)], range(), &tags, "r").unwrap();
        assert_eq!(report.tags.len(), 2);
    }

    proptest! {
        #[test]
        fn test_partitions_are_disjoint_and_complete(
            outages in proptest::collection::vec(0u32..4, 1..40)
        ) {
            let rows: Vec<CheckRow> = outages
                .iter()
                .enumerate()
                .map(|(i, &o)| row(i as u64, &format!("check-{}", 40 - i), o, u64::from(o) * 60, 100.0, Some(1.0)))
                .collect();
            let report = build_report(rows, range(), &tags(), "r").unwrap();

            let with = ids(&report.checks_with_downtime);
            let without = ids(&report.checks_without_downtime);
            prop_assert_eq!(with.len() + without.len(), outages.len());

            let mut all: Vec<u64> = with.iter().chain(without.iter()).copied().collect();
            all.sort_unstable();
            all.dedup();
            prop_assert_eq!(all.len(), outages.len());

            prop_assert_eq!(report.overview.total_outages, outages.iter().map(|&o| u64::from(o)).sum::<u64>());
            let by_outages = report
                .checks_with_downtime
                .windows(2)
                .all(|w| w[0].metrics().outage_count >= w[1].metrics().outage_count);
            let by_name = report
                .checks_without_downtime
                .windows(2)
                .all(|w| w[0].check().name <= w[1].check().name);
            prop_assert!(by_outages);
            prop_assert!(by_name);
        }
    }
}
