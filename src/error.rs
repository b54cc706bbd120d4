//! Error types for the report pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a report run.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("HTTP {status} from {endpoint}")]
    Upstream { endpoint: String, status: u16 },

    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected response body from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("No checks found using tags: {}", .tags.join(","))]
    NoChecksFound { tags: Vec<String> },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid date range: {0}")]
    InvalidRange(String),

    #[error("failed to render report: {0}")]
    Render(#[from] askama::Error),

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A check reported no observed time in the window, so uptime cannot be
/// derived from its status totals.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("check {check_id} has no observed time in the reporting window")]
pub struct DataGap {
    pub check_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_checks_message_lists_tags() {
        let err = ReportError::NoChecksFound {
            tags: vec!["bug_bounty_site".to_string(), "web".to_string()],
        };
        assert_eq!(err.to_string(), "No checks found using tags: bug_bounty_site,web");
    }

    #[test]
    fn test_upstream_message() {
        let err = ReportError::Upstream {
            endpoint: "checks".to_string(),
            status: 403,
        };
        assert_eq!(err.to_string(), "HTTP 403 from checks");
    }
}
