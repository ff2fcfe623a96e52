//! Metrics sinks
//!
//! A sink accepts individual metric points. The reporter submits exactly two
//! points per job (cost and duration) and treats sink failures as non-fatal.

use jobcost_common::{Result, TagSet};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Metric type understood by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Gauge,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
        }
    }
}

/// One metric observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    /// Metric name (e.g. "aws.job.cost")
    pub metric: String,
    pub value: f64,
    /// Unix epoch seconds
    pub timestamp: i64,
    pub tags: TagSet,
    pub kind: MetricKind,
}

impl MetricPoint {
    pub fn gauge(metric: impl Into<String>, value: f64, timestamp: i64, tags: TagSet) -> Self {
        Self {
            metric: metric.into(),
            value,
            timestamp,
            tags,
            kind: MetricKind::Gauge,
        }
    }
}

/// Destination for metric points
pub trait MetricsSink: Send + Sync {
    fn submit(&self, point: &MetricPoint) -> Result<()>;
}

/// Sink that only logs points (dry runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl MetricsSink for LogSink {
    fn submit(&self, point: &MetricPoint) -> Result<()> {
        info!(
            metric = %point.metric,
            value = point.value,
            timestamp = point.timestamp,
            kind = point.kind.as_str(),
            tags = %point.tags,
            "Metric point (dry run)"
        );
        Ok(())
    }
}
