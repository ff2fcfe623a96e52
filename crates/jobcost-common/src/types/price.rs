//! Unit price types
//!
//! A unit price is the hourly USD rate of one resource class in one region.
//! Prices are looked up once, never mutated, and cached for the process
//! lifetime.

use super::usage::ResourceClass;
use serde::{Deserialize, Serialize};

/// Where a unit price came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// Static table entry for the region
    Static,
    /// Region missing from the static table, documented default used
    RegionDefault,
    /// Remote pricing catalog
    Remote,
    /// Remote lookup failed, static fallback table used
    StaticFallback,
    /// Nothing known, priced at zero
    Unavailable,
}

impl PriceSource {
    /// Whether the price is a best-effort substitute for the real rate
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            PriceSource::RegionDefault | PriceSource::StaticFallback | PriceSource::Unavailable
        )
    }
}

/// Hourly price for a resource class in a region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitPrice {
    /// Region the price applies to
    pub region: String,
    /// Priced resource class
    pub resource_class: ResourceClass,
    /// USD per hour (per DPU-hour for worker types, per instance-hour otherwise)
    pub price_per_hour: f64,
    /// USD service fee per instance-hour (cluster instances only)
    pub fee_per_hour: f64,
    /// Provenance of the price
    pub source: PriceSource,
}

impl UnitPrice {
    /// Create a price; negative or non-finite rates are clamped to zero
    pub fn new(
        region: impl Into<String>,
        resource_class: ResourceClass,
        price_per_hour: f64,
        source: PriceSource,
    ) -> Self {
        Self {
            region: region.into(),
            resource_class,
            price_per_hour: non_negative(price_per_hour),
            fee_per_hour: 0.0,
            source,
        }
    }

    /// Attach a per-instance-hour service fee
    pub fn with_fee(mut self, fee_per_hour: f64) -> Self {
        self.fee_per_hour = non_negative(fee_per_hour);
        self
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_price_clamps_rates() {
        let price = UnitPrice::new(
            "us-east-1",
            ResourceClass::InstanceType("m5.xlarge".into()),
            -1.0,
            PriceSource::Remote,
        )
        .with_fee(f64::NAN);

        assert_eq!(price.price_per_hour, 0.0);
        assert_eq!(price.fee_per_hour, 0.0);
    }

    #[test]
    fn test_degraded_sources() {
        assert!(!PriceSource::Static.is_degraded());
        assert!(!PriceSource::Remote.is_degraded());
        assert!(PriceSource::RegionDefault.is_degraded());
        assert!(PriceSource::StaticFallback.is_degraded());
        assert!(PriceSource::Unavailable.is_degraded());
    }
}
