//! Cost estimator
//!
//! Selects the formula matching a usage record, resolves the prices it needs
//! from the catalog, and assembles the cost breakdown.

use crate::catalog::PriceCatalog;
use crate::formula::{batch_worker_cost, dpu_equivalent, ClusterLine};
use jobcost_common::{
    BatchWorkerUsage, ClusterUsage, CostLineItem, CostResult, JobCostError, JobDuration,
    JobEnvironment, Result, UsageRecord,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// Formula selection and price resolution for usage records
#[derive(Clone)]
pub struct CostEstimator {
    catalog: Arc<PriceCatalog>,
}

impl CostEstimator {
    pub fn new(catalog: Arc<PriceCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &PriceCatalog {
        &self.catalog
    }

    /// Estimate the cost of one job run
    ///
    /// Fails on a missing region or an unknown worker type. Price
    /// availability problems never fail the estimate.
    #[instrument(skip(self, record), fields(environment = %record.environment()))]
    pub fn estimate(&self, record: &UsageRecord, duration: JobDuration) -> Result<CostResult> {
        let region = record
            .region()
            .ok_or_else(|| JobCostError::Config("job region is required".to_string()))?;

        match record {
            UsageRecord::BatchWorker(usage) => self.estimate_batch_worker(region, usage, duration),
            UsageRecord::Cluster(usage) => Ok(self.estimate_cluster(region, usage, duration)),
        }
    }

    fn estimate_batch_worker(
        &self,
        region: &str,
        usage: &BatchWorkerUsage,
        duration: JobDuration,
    ) -> Result<CostResult> {
        // Validate the multiplier before touching any price
        let dpu = dpu_equivalent(&self.catalog.tables().worker_capacity, &usage.worker_type)?;
        let price = self.catalog.worker_price(region, &usage.worker_type);
        let cost = batch_worker_cost(usage.worker_count, dpu, duration, price.price_per_hour);

        info!(
            workers = usage.worker_count,
            worker_type = %usage.worker_type,
            dpu_per_worker = dpu,
            duration_seconds = duration.as_secs_f64(),
            price_per_dpu_hour = price.price_per_hour,
            degraded = price.source.is_degraded(),
            cost,
            "Calculated batch worker cost"
        );

        let item = CostLineItem {
            resource_class: price.resource_class,
            units: usage.worker_count,
            capacity_per_unit: dpu,
            unit_price: price.price_per_hour,
            fee_per_hour: 0.0,
            cost,
            price_source: price.source,
        };
        Ok(CostResult::new(JobEnvironment::Glue, duration, vec![item]))
    }

    fn estimate_cluster(
        &self,
        region: &str,
        usage: &ClusterUsage,
        duration: JobDuration,
    ) -> CostResult {
        let items = usage
            .instance_counts
            .iter()
            .map(|(instance_type, &count)| {
                let price = self.catalog.instance_price(region, instance_type);
                let line = ClusterLine {
                    count,
                    price_per_hour: price.price_per_hour,
                    fee_per_hour: price.fee_per_hour,
                };
                let cost = line.cost(duration);

                info!(
                    instance_type = %instance_type,
                    count,
                    price = line.price_per_hour,
                    fee = line.fee_per_hour,
                    degraded = price.source.is_degraded(),
                    duration_seconds = duration.as_secs_f64(),
                    cost,
                    "Calculated cluster instance cost"
                );

                CostLineItem {
                    resource_class: price.resource_class,
                    units: count,
                    capacity_per_unit: 1.0,
                    unit_price: line.price_per_hour,
                    fee_per_hour: line.fee_per_hour,
                    cost,
                    price_source: price.source,
                }
            })
            .collect();

        CostResult::new(JobEnvironment::Emr, duration, items)
    }
}

impl Default for CostEstimator {
    fn default() -> Self {
        Self::new(Arc::new(PriceCatalog::default()))
    }
}
