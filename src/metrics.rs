//! Per-check statistics derived from the outage and average summaries.

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, warn};

use crate::api::{AverageSummary, Check, OutageState, PingdomApi, StatusTotals};
use crate::error::{DataGap, ReportError};
use crate::range::ReportRange;

/// Uptime reported for a check with no observed time in the window.
pub const FALLBACK_UPTIME_PERCENT: f64 = 100.0;

/// Statistics for one check over the reporting window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckMetrics {
    pub downtime_seconds: u64,
    pub outage_count: u32,
    /// Mean response time, `None` when the window holds no samples
    pub response_time_ms: Option<f64>,
    pub uptime_percent: f64,
    /// `uptime_percent` is [`FALLBACK_UPTIME_PERCENT`] rather than measured
    pub data_gap: bool,
}

/// A check together with its metrics. Rows are only produced by the
/// aggregator and are read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckRow {
    check: Check,
    metrics: CheckMetrics,
}

impl CheckRow {
    pub(crate) fn new(check: Check, metrics: CheckMetrics) -> Self {
        Self { check, metrics }
    }

    pub fn check(&self) -> &Check {
        &self.check
    }

    pub fn metrics(&self) -> &CheckMetrics {
        &self.metrics
    }
}

/// Total downtime seconds and outage count over the `down` intervals.
pub fn summarize_outages(states: &[OutageState]) -> (u64, u32) {
    states
        .iter()
        .filter(|state| state.is_down())
        .fold((0, 0), |(downtime, outages), state| {
            (downtime + state.duration_secs(), outages + 1)
        })
}

/// `100 - down / observed * 100`, or [`DataGap`] when nothing was observed.
pub fn uptime_percent(check_id: u64, totals: &StatusTotals) -> Result<f64, DataGap> {
    let observed = totals.observed();
    if observed == 0 {
        return Err(DataGap { check_id });
    }
    Ok(100.0 - (totals.down() as f64 / observed as f64 * 100.0))
}

/// Combines both summaries of a check into its [`CheckMetrics`].
pub fn derive_metrics(check_id: u64, states: &[OutageState], average: &AverageSummary) -> CheckMetrics {
    let (downtime_seconds, outage_count) = summarize_outages(states);

    let (uptime_percent, data_gap) = match uptime_percent(check_id, &average.status_totals) {
        Ok(uptime) => (uptime, false),
        Err(gap) => {
            warn!(
                check_id = check_id,
                fallback = FALLBACK_UPTIME_PERCENT,
                "{gap}, using fallback uptime"
            );
            (FALLBACK_UPTIME_PERCENT, true)
        }
    };

    CheckMetrics {
        downtime_seconds,
        outage_count,
        response_time_ms: average.avg_response_time(),
        uptime_percent,
        data_gap,
    }
}

/// Fetches both summaries for a check and derives its metrics.
///
/// # Arguments
///
/// * `api` - Client used for the two summary queries
/// * `check_id` - The check to query
/// * `range` - Reporting window both queries are scoped to
///
/// # Returns
///
/// * `Ok(CheckMetrics)` on success
/// * `Err` if either query fails
pub async fn compute_metrics(
    api: &PingdomApi,
    check_id: u64,
    range: &ReportRange,
) -> Result<CheckMetrics, ReportError> {
    let states = api.get_outage_summary(check_id, range).await?;
    let average = api.get_average_summary(check_id, range).await?;
    let metrics = derive_metrics(check_id, &states, &average);

    debug!(
        check_id = check_id,
        downtime_seconds = metrics.downtime_seconds,
        outages = metrics.outage_count,
        response_time_ms = ?metrics.response_time_ms,
        uptime = metrics.uptime_percent,
        "Computed check metrics"
    );
    Ok(metrics)
}

/// Computes metrics for every check, keeping the input order.
///
/// At most `concurrency` checks are in flight at once; `1` queries them one
/// after another. The first failure aborts the whole collection.
pub async fn collect_metrics(
    api: &PingdomApi,
    checks: Vec<Check>,
    range: &ReportRange,
    concurrency: usize,
) -> Result<Vec<CheckRow>, ReportError> {
    stream::iter(checks)
        .map(|check| async move {
            debug!(check_id = check.id, name = %check.name, status = %check.status, "Fetching summaries");
            let metrics = compute_metrics(api, check.id, range).await?;
            Ok::<_, ReportError>(CheckRow::new(check, metrics))
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await
}
