//! Job cost reporter
//!
//! Entry point of the engine: estimate the cost of a job run, tag it, and
//! emit cost and duration gauges to the metrics sink.

use crate::aws_pricing::AwsPricingClient;
use crate::config::{ReporterConfig, DEFAULT_METRIC_PREFIX};
use crate::datadog::DatadogSink;
use crate::sink::{MetricPoint, MetricsSink};
use crate::tags::build_tags;
use chrono::{DateTime, Utc};
use jobcost_common::{CostResult, JobCostError, JobDuration, Result, UsageRecord};
use jobcost_pricing::{CostEstimator, PriceCatalog};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Computes job costs and reports them to a metrics sink
pub struct CostReporter {
    estimator: CostEstimator,
    sink: Arc<dyn MetricsSink>,
    metric_prefix: String,
}

impl CostReporter {
    pub fn new(estimator: CostEstimator, sink: Arc<dyn MetricsSink>) -> Self {
        Self {
            estimator,
            sink,
            metric_prefix: DEFAULT_METRIC_PREFIX.to_string(),
        }
    }

    /// Emit `<prefix>.job.cost` and `<prefix>.job.duration`
    pub fn with_metric_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.metric_prefix = prefix.into();
        self
    }

    /// Reporter wired to Datadog from configuration
    ///
    /// Fails when the API key is missing or the pricing tables can't be
    /// loaded.
    pub fn from_config(config: &ReporterConfig) -> Result<Self> {
        let api_key = config.require_api_key()?;
        let sink = DatadogSink::new(api_key, &config.datadog)?;
        Self::with_sink(config, Arc::new(sink))
    }

    /// Reporter built from configuration around an arbitrary sink
    ///
    /// Instance prices are queried from the Price List API when
    /// `pricing.enabled` is set.
    pub fn with_sink(config: &ReporterConfig, sink: Arc<dyn MetricsSink>) -> Result<Self> {
        let mut catalog = PriceCatalog::new(config.pricing_tables()?)
            .with_retry_policy(config.retry.clone());
        if config.pricing.enabled {
            let client = AwsPricingClient::new(&config.pricing)?;
            info!(endpoint = client.endpoint(), "Dynamic instance pricing enabled");
            catalog = catalog.with_remote(Arc::new(client));
        }
        let estimator = CostEstimator::new(Arc::new(catalog));
        Ok(Self::new(estimator, sink).with_metric_prefix(config.metric_prefix.clone()))
    }

    pub fn estimator(&self) -> &CostEstimator {
        &self.estimator
    }

    pub fn cost_metric(&self) -> String {
        format!("{}.job.cost", self.metric_prefix)
    }

    pub fn duration_metric(&self) -> String {
        format!("{}.job.duration", self.metric_prefix)
    }

    /// Compute the cost of a job run and report it
    ///
    /// Configuration and input errors, and unknown worker types, fail the
    /// call before any metric is emitted. Metric submission failures are
    /// logged and do not affect the returned cost.
    #[instrument(skip(self, record), fields(environment = %record.environment()))]
    pub fn report_job_cost(
        &self,
        customer_id: &str,
        record: &UsageRecord,
        duration_seconds: f64,
        success: bool,
    ) -> Result<CostResult> {
        let duration = JobDuration::from_seconds(duration_seconds)?;
        self.report(customer_id, record, duration, success)
    }

    /// Report a job run that started at `started_at` and finished now
    pub fn report_job_cost_since(
        &self,
        customer_id: &str,
        record: &UsageRecord,
        started_at: DateTime<Utc>,
        success: bool,
    ) -> Result<CostResult> {
        let duration = JobDuration::since(started_at)?;
        self.report(customer_id, record, duration, success)
    }

    fn report(
        &self,
        customer_id: &str,
        record: &UsageRecord,
        duration: JobDuration,
        success: bool,
    ) -> Result<CostResult> {
        if customer_id.trim().is_empty() {
            return Err(JobCostError::Config("customer id is required".to_string()));
        }
        if record.region().is_none() {
            return Err(JobCostError::Config("job region is required".to_string()));
        }

        let environment = record.environment();
        let result = self.estimator.estimate(record, duration)?;
        let tags = build_tags(customer_id, environment, record, success);

        let timestamp = Utc::now().timestamp();
        let points = [
            MetricPoint::gauge(self.cost_metric(), result.total_cost, timestamp, tags.clone()),
            MetricPoint::gauge(
                self.duration_metric(),
                duration.as_secs_f64(),
                timestamp,
                tags.clone(),
            ),
        ];

        for point in &points {
            if let Err(e) = self.sink.submit(point) {
                error!(metric = %point.metric, error = %e, "Error sending metric");
            }
        }

        info!(
            cost = format!("{:.4}", result.total_cost),
            degraded_pricing = result.has_degraded_prices(),
            tags = %tags,
            "Job cost reported"
        );
        Ok(result)
    }
}
