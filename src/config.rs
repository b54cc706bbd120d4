//! Run configuration.
//!
//! Settings come from environment variables (optionally via `.env`), and
//! command line flags override them in `main`.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ReportError;

pub const DEFAULT_API_URL: &str = "https://api.pingdom.com/api/3.1";
pub const DEFAULT_OUTPUT_DIR: &str = "reports";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection and output settings for one report run.
#[derive(Clone)]
pub struct ReportConfig {
    /// Base URL of the monitoring API
    pub api_base_url: String,
    /// Bearer token sent with every request
    pub credential: String,
    /// Directory the rendered report is written to
    pub output_dir: PathBuf,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Number of checks whose metrics are fetched at once
    pub concurrency: usize,
}

impl fmt::Debug for ReportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportConfig")
            .field("api_base_url", &self.api_base_url)
            .field("credential", &"<redacted>")
            .field("output_dir", &self.output_dir)
            .field("request_timeout", &self.request_timeout)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl ReportConfig {
    pub fn new(credential: impl Into<String>) -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            credential: credential.into(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency: 1,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PINGDOM_API_TOKEN`: API token (required)
    /// - `PINGDOM_API_URL`: API base URL (default: `https://api.pingdom.com/api/3.1`)
    /// - `PINGDOM_REPORT_DIR`: output directory (default: `reports`)
    /// - `PINGDOM_REQUEST_TIMEOUT_SECS`: request timeout in seconds (default: 30)
    pub fn from_env() -> Result<Self, ReportError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ReportConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ReportError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credential = lookup("PINGDOM_API_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| ReportError::Config("PINGDOM_API_TOKEN is not set".to_string()))?;
        let mut cfg = Self::new(credential);

        if let Some(url) = lookup("PINGDOM_API_URL") {
            cfg.api_base_url = url;
        }

        if let Some(dir) = lookup("PINGDOM_REPORT_DIR") {
            cfg.output_dir = PathBuf::from(dir);
        }

        if let Some(secs) = lookup("PINGDOM_REQUEST_TIMEOUT_SECS") {
            cfg.request_timeout = parse_timeout_secs(&secs)
                .map_err(|e| ReportError::Config(format!("PINGDOM_REQUEST_TIMEOUT_SECS {e}")))?;
        }

        Ok(cfg)
    }
}

/// Parses a request timeout in whole seconds, which must be at least 1
pub fn parse_timeout_secs(value: &str) -> Result<Duration, String> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err("timeout must be at least 1 second".to_string()),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(_) => Err(format!("is not a number: {value}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = ReportConfig::from_lookup(lookup_from(&[("PINGDOM_API_TOKEN", "secret")])).unwrap();
        assert_eq!(cfg.api_base_url, DEFAULT_API_URL);
        assert_eq!(cfg.credential, "secret");
        assert_eq!(cfg.output_dir, PathBuf::from("reports"));
        assert_eq!(cfg.request_timeout, Duration::from_secs(30));
        assert_eq!(cfg.concurrency, 1);
    }

    #[test]
    fn test_overrides() {
        let cfg = ReportConfig::from_lookup(lookup_from(&[
            ("PINGDOM_API_TOKEN", "secret"),
            ("PINGDOM_API_URL", "http://localhost:9000/api"),
            ("PINGDOM_REPORT_DIR", "/tmp/out"),
            ("PINGDOM_REQUEST_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(cfg.api_base_url, "http://localhost:9000/api");
        assert_eq!(cfg.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(cfg.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_token() {
        let err = ReportConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));

        let err = ReportConfig::from_lookup(lookup_from(&[("PINGDOM_API_TOKEN", "  ")])).unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn test_bad_timeout() {
        let err = ReportConfig::from_lookup(lookup_from(&[
            ("PINGDOM_API_TOKEN", "secret"),
            ("PINGDOM_REQUEST_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = ReportConfig::from_lookup(lookup_from(&[
            ("PINGDOM_API_TOKEN", "secret"),
            ("PINGDOM_REQUEST_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
        assert!(parse_timeout_secs("0").is_err());
        assert_eq!(parse_timeout_secs(" 12 "), Ok(Duration::from_secs(12)));
    }

    #[test]
    fn test_debug_redacts_credential() {
        let cfg = ReportConfig::new("super-secret");
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
