//! Cost result and job duration types

use super::price::PriceSource;
use super::usage::{JobEnvironment, ResourceClass};
use crate::error::{JobCostError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Seconds per billing hour
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Wall-clock duration of a job run in seconds
///
/// Always finite and non-negative. Built explicitly by the caller from a
/// measured number of seconds or from start/finish timestamps.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct JobDuration(f64);

impl JobDuration {
    pub const ZERO: JobDuration = JobDuration(0.0);

    pub fn from_seconds(seconds: f64) -> Result<Self> {
        if !seconds.is_finite() {
            return Err(JobCostError::Validation(format!(
                "duration must be finite, got {}",
                seconds
            )));
        }
        if seconds < 0.0 {
            return Err(JobCostError::Validation(format!(
                "duration cannot be negative, got {}",
                seconds
            )));
        }
        Ok(Self(seconds))
    }

    /// Duration between two timestamps
    pub fn between(started_at: DateTime<Utc>, finished_at: DateTime<Utc>) -> Result<Self> {
        let elapsed = finished_at.signed_duration_since(started_at);
        let millis = elapsed.num_milliseconds();
        if millis < 0 {
            return Err(JobCostError::Validation(format!(
                "job finished at {} before it started at {}",
                finished_at, started_at
            )));
        }
        Ok(Self(millis as f64 / 1000.0))
    }

    /// Duration from `started_at` until now
    pub fn since(started_at: DateTime<Utc>) -> Result<Self> {
        Self::between(started_at, Utc::now())
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0
    }

    /// Duration as a fraction of a billing hour
    pub fn hours(&self) -> f64 {
        self.0 / SECONDS_PER_HOUR
    }
}

impl TryFrom<f64> for JobDuration {
    type Error = JobCostError;

    fn try_from(seconds: f64) -> Result<Self> {
        Self::from_seconds(seconds)
    }
}

impl From<JobDuration> for f64 {
    fn from(duration: JobDuration) -> Self {
        duration.0
    }
}

/// Cost of one priced resource class within a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLineItem {
    /// Resource class the line prices
    pub resource_class: ResourceClass,
    /// Workers or instances of this class
    pub units: u32,
    /// Capacity units per worker (DPUs); 1.0 for instances
    pub capacity_per_unit: f64,
    /// USD per capacity-unit hour
    pub unit_price: f64,
    /// USD service fee per unit hour
    pub fee_per_hour: f64,
    /// USD cost of the line
    pub cost: f64,
    /// Provenance of the unit price
    pub price_source: PriceSource,
}

/// Computed cost of one job run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostResult {
    /// Total cost in USD
    pub total_cost: f64,
    /// Duration the cost was amortized over
    pub duration_seconds: f64,
    /// Environment whose formula produced the cost
    pub environment: JobEnvironment,
    /// Hourly rates were prorated to the job duration
    pub hourly_amortized: bool,
    /// Per-resource breakdown
    pub line_items: Vec<CostLineItem>,
}

impl CostResult {
    pub fn new(
        environment: JobEnvironment,
        duration: JobDuration,
        line_items: Vec<CostLineItem>,
    ) -> Self {
        let total_cost = line_items.iter().map(|item| item.cost).sum::<f64>().max(0.0);
        Self {
            total_cost,
            duration_seconds: duration.as_secs_f64(),
            environment,
            hourly_amortized: true,
            line_items,
        }
    }

    /// Whether any line was priced from a fallback instead of a real rate
    pub fn has_degraded_prices(&self) -> bool {
        self.line_items
            .iter()
            .any(|item| item.price_source.is_degraded())
    }
}
