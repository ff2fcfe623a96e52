//! # jobcost Reporter
//!
//! Computes the cost of finished batch jobs and reports it as metrics.
//!
//! ## Flow
//!
//! ```text
//! UsageRecord + duration
//!     -> CostEstimator (prices from PriceCatalog)
//!     -> build_tags
//!     -> MetricsSink: <prefix>.job.cost, <prefix>.job.duration
//! ```
//!
//! Sink failures are logged and never change the computed cost.

pub mod aws_pricing;
pub mod config;
pub mod datadog;
pub mod reporter;
pub mod sigv4;
pub mod sink;
pub mod tags;

pub use aws_pricing::AwsPricingClient;
pub use config::{
    DatadogSettings, PricingSettings, ReporterConfig, DEFAULT_DATADOG_SITE, DEFAULT_METRIC_PREFIX,
    DEFAULT_PRICING_ENDPOINT,
};
pub use datadog::DatadogSink;
pub use reporter::CostReporter;
pub use sigv4::{AwsCredentials, SigV4Signer};
pub use sink::{LogSink, MetricKind, MetricPoint, MetricsSink};
pub use tags::{build_tags, UNKNOWN};
