//! # jobcost Pricing
//!
//! Price catalog and cost formulas for batch-worker and cluster jobs.
//!
//! ## Cost Formulas
//!
//! ```text
//! Glue: cost = workers × DPU(worker_type) × (seconds / 3600) × price per DPU-hour
//! EMR:  cost = Σ (price(instance) + fee(instance)) × count × (seconds / 3600)
//! ```
//!
//! ## Price Resolution
//!
//! - Worker types: static region table, default price for unknown regions
//! - Instance types: remote catalog with bounded retries, static table
//!   fallback, 0.0 as last resort
//! - Both paths cached per (region, resource class)

pub mod catalog;
pub mod estimator;
pub mod formula;
pub mod retry;

pub use catalog::{
    CacheStats, PriceCatalog, PricingTables, ProductQuery, RemotePriceSource, TermFilter,
};
pub use estimator::CostEstimator;
pub use formula::{batch_worker_cost, cluster_cost, dpu_equivalent, ClusterLine};
pub use retry::{RetryOutcome, RetryPolicy};
