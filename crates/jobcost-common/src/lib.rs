//! # jobcost Common
//!
//! Shared types and errors for the jobcost cost engine.
//!
//! ## Core Types
//!
//! - [`UsageRecord`]: resources consumed by one job run (batch-worker or cluster)
//! - [`UnitPrice`]: hourly price of a resource class in a region
//! - [`CostResult`]: computed job cost with per-resource breakdown
//! - [`TagSet`]: ordered low-cardinality metric tags
//! - [`JobDuration`]: explicit, validated job duration

pub mod error;
pub mod types;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

// Re-export commonly used types at crate root
pub use error::{JobCostError, PricingError, Result};
pub use types::{
    cost::{CostLineItem, CostResult, JobDuration, SECONDS_PER_HOUR},
    price::{PriceSource, UnitPrice},
    tags::{normalize_tag_value, TagSet, MAX_TAG_VALUE_LEN},
    usage::{BatchWorkerUsage, ClusterUsage, JobEnvironment, ResourceClass, UsageRecord},
};

/// jobcost version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Currency every price and cost is expressed in
pub const CURRENCY: &str = "USD";
