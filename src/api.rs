//! Pingdom API client.
//!
//! Only the three read endpoints the report needs are wrapped. Every call
//! either returns the decoded payload or a [`ReportError`]; nothing is retried.

use std::collections::BTreeMap;

use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::range::ReportRange;

/// A monitored endpoint as reported by `/checks`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Check {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub hostname: String,
    /// Last known state (`up`, `down`, `paused`, ...)
    pub status: String,
}

#[derive(Debug, Deserialize)]
struct ChecksResponse {
    #[serde(default)]
    checks: Vec<Check>,
}

/// One state interval from `/summary.outage`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutageState {
    pub status: String,
    #[serde(rename = "timefrom")]
    pub time_from: i64,
    #[serde(rename = "timeto")]
    pub time_to: i64,
}

impl OutageState {
    #[cfg(test)]
    pub fn new(status: &str, time_from: i64, time_to: i64) -> Self {
        Self {
            status: status.to_string(),
            time_from,
            time_to,
        }
    }

    pub fn is_down(&self) -> bool {
        self.status == "down"
    }

    /// Interval length in seconds; inverted intervals count as zero.
    pub fn duration_secs(&self) -> u64 {
        u64::try_from(self.time_to - self.time_from).unwrap_or(0)
    }
}

#[derive(Debug, Deserialize)]
struct OutageSummaryResponse {
    summary: OutageSummary,
}

#[derive(Debug, Deserialize)]
struct OutageSummary {
    #[serde(default)]
    states: Vec<OutageState>,
}

/// Seconds spent in each status over the window, keyed as the API reports
/// them (`totalup`, `totaldown`, `totalunknown`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct StatusTotals(BTreeMap<String, u64>);

impl StatusTotals {
    #[cfg(test)]
    pub fn new<I, K>(totals: I) -> Self
    where
        I: IntoIterator<Item = (K, u64)>,
        K: Into<String>,
    {
        Self(totals.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn down(&self) -> u64 {
        self.0.get("totaldown").copied().unwrap_or(0)
    }

    /// Sum over every reported status.
    pub fn observed(&self) -> u64 {
        self.0.values().sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResponseTime {
    #[serde(rename = "avgresponse")]
    pub avg_response: Option<f64>,
}

/// Payload of `/summary.average` with `includeuptime=true`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AverageSummary {
    #[serde(rename = "responsetime", default)]
    pub response_time: Option<ResponseTime>,
    #[serde(rename = "status", default)]
    pub status_totals: StatusTotals,
}

impl AverageSummary {
    pub fn avg_response_time(&self) -> Option<f64> {
        self.response_time.as_ref().and_then(|r| r.avg_response)
    }
}

#[derive(Debug, Deserialize)]
struct AverageSummaryResponse {
    summary: AverageSummary,
}

/// Pingdom API client for making authenticated requests
#[derive(Clone)]
pub struct PingdomApi {
    /// Base URL for the Pingdom API
    api_uri: String,
    /// HTTP client with authentication headers and timeout
    client: Client,
}

impl PingdomApi {
    /// Creates a client from the run configuration.
    ///
    /// The bearer credential is installed as a default header, responses are
    /// requested gzip-compressed, and every request is bounded by
    /// `config.request_timeout`.
    pub fn new(config: &ReportConfig) -> Result<Self, ReportError> {
        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", config.credential))
            .map_err(|_| ReportError::Config("credential is not a valid header value".into()))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .gzip(true)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ReportError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(PingdomApi {
            api_uri: config.api_base_url.clone(),
            client,
        })
    }

    /// Retrieves the checks carrying any of `tags`.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Check>)` in the order the API lists them, never empty
    /// * `Err(ReportError::NoChecksFound)` if the filter matched nothing
    /// * `Err` for any HTTP or decoding failure
    pub async fn fetch_checks(&self, tags: &[String]) -> Result<Vec<Check>, ReportError> {
        let mut url = self.endpoint(&["checks"])?;
        url.query_pairs_mut().append_pair("tags", &tags.join(","));

        let parsed: ChecksResponse = self.get_json(url, "checks").await?;
        if parsed.checks.is_empty() {
            return Err(ReportError::NoChecksFound {
                tags: tags.to_vec(),
            });
        }
        Ok(parsed.checks)
    }

    /// Retrieves the state intervals of a check within `range`.
    pub async fn get_outage_summary(
        &self,
        check_id: u64,
        range: &ReportRange,
    ) -> Result<Vec<OutageState>, ReportError> {
        let id = check_id.to_string();
        let mut url = self.endpoint(&["summary.outage", &id])?;
        url.query_pairs_mut()
            .append_pair("from", &range.from_timestamp().to_string())
            .append_pair("to", &range.to_timestamp().to_string());

        let parsed: OutageSummaryResponse = self
            .get_json(url, &format!("summary.outage/{check_id}"))
            .await?;
        Ok(parsed.summary.states)
    }

    /// Retrieves average response time and per-status totals of a check
    /// within `range`.
    pub async fn get_average_summary(
        &self,
        check_id: u64,
        range: &ReportRange,
    ) -> Result<AverageSummary, ReportError> {
        let id = check_id.to_string();
        let mut url = self.endpoint(&["summary.average", &id])?;
        url.query_pairs_mut()
            .append_pair("from", &range.from_timestamp().to_string())
            .append_pair("to", &range.to_timestamp().to_string())
            .append_pair("includeuptime", "true");

        let parsed: AverageSummaryResponse = self
            .get_json(url, &format!("summary.average/{check_id}"))
            .await?;
        Ok(parsed.summary)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ReportError> {
        let mut url = Url::parse(&self.api_uri)
            .map_err(|e| ReportError::Config(format!("invalid API URL {}: {e}", self.api_uri)))?;
        url.path_segments_mut()
            .map_err(|_| ReportError::Config(format!("API URL cannot be a base: {}", self.api_uri)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, endpoint: &str) -> Result<T, ReportError> {
        let request_failed = |source| ReportError::Request {
            endpoint: endpoint.to_string(),
            source,
        };

        let resp = self.client.get(url).send().await.map_err(request_failed)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ReportError::Upstream {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(request_failed)?;
        serde_json::from_str(&body).map_err(|source| ReportError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}
