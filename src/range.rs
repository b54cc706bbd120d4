//! Reporting window resolution.
//!
//! A run covers either the trailing `n` days up to now, or the whole of the
//! previous calendar month when no day count is given. All arithmetic is UTC.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeDelta, Utc};

use crate::error::ReportError;

/// The `[from, to]` window a report covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// Human readable window name, e.g. `30 day` or `March, 2024`
    pub label: String,
    /// Output file name without the report suffix, e.g. `30 day` or `March`
    pub file_stem: String,
    /// Day count for rolling windows, `None` for monthly reports
    pub days: Option<u32>,
}

impl ReportRange {
    /// UNIX seconds of the window start, as the monitoring API expects it.
    pub fn from_timestamp(&self) -> i64 {
        self.from.timestamp()
    }

    /// UNIX seconds of the window end.
    pub fn to_timestamp(&self) -> i64 {
        self.to.timestamp()
    }

    pub fn file_name(&self) -> String {
        format!("{}_pingdom_report.html", self.file_stem)
    }

    /// `YYYY-MM-DD to YYYY-MM-DD`
    pub fn date_span(&self) -> String {
        format!(
            "{} to {}",
            self.from.format("%Y-%m-%d"),
            self.to.format("%Y-%m-%d")
        )
    }
}

/// Resolves the reporting window relative to `now`.
///
/// `Some(0)` is a zero-width rolling window, only `None` selects the
/// previous calendar month.
///
/// # Returns
///
/// * `Ok(ReportRange)` for the requested mode
/// * `Err(ReportError::InvalidRange)` if the window start is not representable
pub fn resolve_range(days: Option<u32>, now: DateTime<Utc>) -> Result<ReportRange, ReportError> {
    match days {
        Some(days) => rolling_range(days, now),
        None => previous_month_range(now),
    }
}

fn rolling_range(days: u32, now: DateTime<Utc>) -> Result<ReportRange, ReportError> {
    let from = TimeDelta::try_days(i64::from(days))
        .and_then(|span| now.checked_sub_signed(span))
        .ok_or_else(|| ReportError::InvalidRange(format!("{days} days before {now}")))?;
    let label = format!("{days} day");

    Ok(ReportRange {
        from,
        to: now,
        file_stem: label.clone(),
        label,
        days: Some(days),
    })
}

fn previous_month_range(now: DateTime<Utc>) -> Result<ReportRange, ReportError> {
    let invalid = || ReportError::InvalidRange(format!("previous month of {now}"));

    let first_of_month = now.date_naive().with_day(1).ok_or_else(invalid)?;
    let last_of_previous: NaiveDate = first_of_month.pred_opt().ok_or_else(invalid)?;
    let first_of_previous = last_of_previous.with_day(1).ok_or_else(invalid)?;
    let start_of_day = NaiveTime::from_hms_opt(0, 0, 0).ok_or_else(invalid)?;
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).ok_or_else(invalid)?;

    let from = first_of_previous.and_time(start_of_day).and_utc();
    let to = last_of_previous.and_time(end_of_day).and_utc();

    Ok(ReportRange {
        from,
        to,
        label: to.format("%B, %Y").to_string(),
        file_stem: to.format("%B").to_string(),
        days: None,
    })
}
