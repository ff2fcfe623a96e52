//! Datadog metrics sink
//!
//! Posts gauge series to the v1 series endpoint:
//!
//! ```text
//! POST {site}/api/v1/series
//! {"series": [{"metric": "...", "points": [[ts, value]], "tags": [...], "type": "gauge"}]}
//! ```

use crate::config::DatadogSettings;
use crate::sink::{MetricPoint, MetricsSink};
use jobcost_common::{JobCostError, Result};
use reqwest::blocking::Client;
use serde::Serialize;
use tracing::{debug, instrument};

const SERIES_PATH: &str = "/api/v1/series";

#[derive(Debug, Serialize)]
struct SeriesPayload<'a> {
    series: Vec<Series<'a>>,
}

#[derive(Debug, Serialize)]
struct Series<'a> {
    metric: &'a str,
    points: Vec<(i64, f64)>,
    tags: &'a [String],
    #[serde(rename = "type")]
    kind: &'static str,
}

impl<'a> From<&'a MetricPoint> for SeriesPayload<'a> {
    fn from(point: &'a MetricPoint) -> Self {
        Self {
            series: vec![Series {
                metric: &point.metric,
                points: vec![(point.timestamp, point.value)],
                tags: point.tags.as_slice(),
                kind: point.kind.as_str(),
            }],
        }
    }
}

/// Blocking HTTP sink for the Datadog series API
pub struct DatadogSink {
    client: Client,
    endpoint: String,
    api_key: String,
    app_key: Option<String>,
}

impl DatadogSink {
    /// Build a sink; the API key is passed through untouched
    pub fn new(api_key: impl Into<String>, settings: &DatadogSettings) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(JobCostError::Config("Datadog API key is required".to_string()));
        }

        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| JobCostError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", settings.site.trim_end_matches('/'), SERIES_PATH),
            api_key,
            app_key: settings.app_key.clone().filter(|key| !key.is_empty()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl MetricsSink for DatadogSink {
    #[instrument(skip(self, point), fields(metric = %point.metric))]
    fn submit(&self, point: &MetricPoint) -> Result<()> {
        let payload = SeriesPayload::from(point);

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("DD-API-KEY", &self.api_key)
            .json(&payload);
        if let Some(app_key) = &self.app_key {
            request = request.header("DD-APPLICATION-KEY", app_key);
        }

        let response = request
            .send()
            .map_err(|e| JobCostError::MetricSubmission(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(JobCostError::MetricSubmission(format!(
                "series endpoint returned {}: {}",
                status, body
            )));
        }

        debug!(status = %status, "Sent metric");
        Ok(())
    }
}
