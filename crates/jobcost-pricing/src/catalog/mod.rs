//! Price catalog
//!
//! Resolves hourly unit prices per (region, resource class):
//! - Worker types: static region table, documented default for unknown regions
//! - Instance types: remote catalog under a retry policy, static table
//!   fallback, zero as the last resort
//!
//! Every resolved price is cached for the lifetime of the catalog.

pub mod cache;
pub mod remote;
pub mod tables;

pub use cache::{CacheKey, CacheStats, PriceCache};
pub use remote::{extract_hourly_price, ProductQuery, RemotePriceSource, TermFilter};
pub use tables::{PricingTables, DEFAULT_LOCATION, DEFAULT_WORKER_PRICE_PER_HOUR};

use crate::retry::{RetryOutcome, RetryPolicy};
use jobcost_common::{PriceSource, PricingError, ResourceClass, UnitPrice};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Capacity of the worker-type price cache
pub const WORKER_CACHE_CAPACITY: usize = 32;

/// Capacity of the instance-type price cache
pub const INSTANCE_CACHE_CAPACITY: usize = 128;

/// Cached, failure-tolerant unit price lookup
pub struct PriceCatalog {
    tables: PricingTables,
    remote: Option<Arc<dyn RemotePriceSource>>,
    retry: RetryPolicy,
    worker_cache: PriceCache,
    instance_cache: PriceCache,
}

impl PriceCatalog {
    /// Catalog backed only by static tables
    pub fn new(tables: PricingTables) -> Self {
        Self {
            tables,
            remote: None,
            retry: RetryPolicy::default(),
            worker_cache: PriceCache::new(WORKER_CACHE_CAPACITY),
            instance_cache: PriceCache::new(INSTANCE_CACHE_CAPACITY),
        }
    }

    /// Query instance prices from a remote catalog first
    pub fn with_remote(mut self, remote: Arc<dyn RemotePriceSource>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn tables(&self) -> &PricingTables {
        &self.tables
    }

    /// Unit price of a resource class in a region
    ///
    /// Never fails: unavailable prices degrade to a static or zero price and
    /// are reported through warning logs.
    pub fn get_unit_price(&self, region: &str, resource_class: &ResourceClass) -> UnitPrice {
        match resource_class {
            ResourceClass::WorkerType(worker_type) => self.worker_price(region, worker_type),
            ResourceClass::InstanceType(instance_type) => {
                self.instance_price(region, instance_type)
            }
        }
    }

    /// Price per DPU-hour of a worker type
    pub fn worker_price(&self, region: &str, worker_type: &str) -> UnitPrice {
        let class = ResourceClass::WorkerType(worker_type.to_string());
        let key = CacheKey::new(region, &class);
        self.worker_cache
            .get_or_insert_with(key, || self.resolve_worker_price(region, class))
    }

    /// Price per instance-hour of an instance type, service fee included
    pub fn instance_price(&self, region: &str, instance_type: &str) -> UnitPrice {
        let class = ResourceClass::InstanceType(instance_type.to_string());
        let key = CacheKey::new(region, &class);
        self.instance_cache
            .get_or_insert_with(key, || self.resolve_instance_price(region, class))
    }

    /// Service fee per instance-hour; 0.0 for unknown combinations
    pub fn get_service_fee(&self, region: &str, instance_type: &str) -> f64 {
        self.tables.service_fee(region, instance_type).unwrap_or(0.0)
    }

    pub fn worker_cache_stats(&self) -> CacheStats {
        self.worker_cache.stats()
    }

    pub fn instance_cache_stats(&self) -> CacheStats {
        self.instance_cache.stats()
    }

    fn resolve_worker_price(&self, region: &str, class: ResourceClass) -> UnitPrice {
        match self.tables.worker_price(region) {
            Some(price) => UnitPrice::new(region, class, price, PriceSource::Static),
            None => {
                let price = self.tables.default_worker_price_per_hour;
                warn!(
                    region,
                    worker_type = %class,
                    default_price = price,
                    "No worker pricing data for region; using default price"
                );
                UnitPrice::new(region, class, price, PriceSource::RegionDefault)
            }
        }
    }

    #[instrument(skip(self), fields(instance_type = %class))]
    fn resolve_instance_price(&self, region: &str, class: ResourceClass) -> UnitPrice {
        let fee = self.get_service_fee(region, class.name());

        let reason = match self.fetch_remote_price(region, class.name()) {
            Ok(price) => {
                info!(region, price, "Dynamic pricing resolved");
                return UnitPrice::new(region, class, price, PriceSource::Remote).with_fee(fee);
            }
            Err(reason) => reason,
        };

        let degraded = PricingError::LookupDegraded {
            region: region.to_string(),
            resource_class: class.name().to_string(),
            reason,
        };

        match self.tables.instance_price(region, class.name()) {
            Some(price) => {
                warn!(error = %degraded, fallback_price = price, "Using static instance price");
                UnitPrice::new(region, class, price, PriceSource::StaticFallback).with_fee(fee)
            }
            None => {
                let unavailable = PricingError::PriceUnavailable {
                    region: region.to_string(),
                    resource_class: class.name().to_string(),
                };
                warn!(error = %degraded, "{}; pricing at 0.0", unavailable);
                UnitPrice::new(region, class, 0.0, PriceSource::Unavailable).with_fee(fee)
            }
        }
    }

    /// Remote lookup under the retry policy; `Err` carries the degradation reason
    fn fetch_remote_price(&self, region: &str, instance_type: &str) -> Result<f64, String> {
        let remote = self
            .remote
            .as_ref()
            .ok_or_else(|| "no remote pricing catalog configured".to_string())?;

        let query = ProductQuery::on_demand_linux(self.tables.location(region), instance_type);
        let outcome = self.retry.run(
            || remote.get_products(&query),
            PricingError::is_transient,
        );

        let products = match outcome {
            RetryOutcome::Success { result, .. } => result,
            RetryOutcome::Exhausted {
                last_error,
                attempts,
            } => {
                return Err(format!("{} after {} attempt(s)", last_error, attempts));
            }
        };

        let first = products
            .first()
            .ok_or_else(|| "no dynamic pricing data found".to_string())?;
        extract_hourly_price(first).map_err(|e| e.to_string())
    }
}

impl Default for PriceCatalog {
    fn default() -> Self {
        Self::new(PricingTables::default())
    }
}
