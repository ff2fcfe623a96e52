//! Static pricing tables
//!
//! The built-in constants are illustrative list prices. Operators should load
//! authoritative values with [`PricingTables::from_json_file`].

use jobcost_common::{JobCostError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Price per DPU-hour used when a region has no batch-worker entry
pub const DEFAULT_WORKER_PRICE_PER_HOUR: f64 = 0.44;

/// Catalog location used when a region has no location mapping
pub const DEFAULT_LOCATION: &str = "US East (N. Virginia)";

/// Static prices, fees, capacity multipliers and region locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingTables {
    /// DPUs per worker, keyed by worker type
    pub worker_capacity: HashMap<String, f64>,
    /// USD per DPU-hour, keyed by region
    pub worker_price_per_hour: HashMap<String, f64>,
    /// Fallback USD per DPU-hour for unlisted regions
    pub default_worker_price_per_hour: f64,
    /// USD per instance-hour, keyed by region then instance type
    pub instance_price_per_hour: HashMap<String, HashMap<String, f64>>,
    /// USD service fee per instance-hour, keyed by region then instance type
    pub service_fee_per_hour: HashMap<String, HashMap<String, f64>>,
    /// Pricing catalog location name, keyed by region
    pub region_locations: HashMap<String, String>,
}

impl Default for PricingTables {
    fn default() -> Self {
        let worker_capacity = [
            ("G.025X", 0.25),
            ("G.05X", 0.5),
            ("G.1X", 1.0),
            ("G.2X", 2.0),
            ("G.4X", 4.0),
            ("G.8X", 8.0),
            ("G.16X", 16.0),
            ("G.32X", 32.0),
            ("G.64X", 64.0),
            ("G.128X", 128.0),
        ];

        let worker_price_per_hour = [
            ("us-east-1", 0.44),
            ("us-west-1", 0.50),
            ("sa-east-1", 0.428),
        ];

        let instance_price_per_hour = [
            ("us-east-1", [("m5.xlarge", 0.192), ("m5.2xlarge", 0.768)]),
            ("us-west-1", [("m5.xlarge", 0.200), ("m5.2xlarge", 0.800)]),
            ("sa-east-1", [("m5.xlarge", 0.250), ("m5.2xlarge", 1.00)]),
        ];

        let service_fee_per_hour = [
            ("us-east-1", [("m5.xlarge", 0.022), ("m5.2xlarge", 0.05)]),
            ("us-west-1", [("m5.xlarge", 0.025), ("m5.2xlarge", 0.055)]),
            ("sa-east-1", [("m5.xlarge", 0.030), ("m5.2xlarge", 0.060)]),
        ];

        let region_locations = [
            ("us-east-1", "US East (N. Virginia)"),
            ("us-west-1", "US West (N. California)"),
            ("sa-east-1", "South America (São Paulo)"),
        ];

        Self {
            worker_capacity: to_map(worker_capacity),
            worker_price_per_hour: to_map(worker_price_per_hour),
            default_worker_price_per_hour: DEFAULT_WORKER_PRICE_PER_HOUR,
            instance_price_per_hour: to_nested_map(instance_price_per_hour),
            service_fee_per_hour: to_nested_map(service_fee_per_hour),
            region_locations: region_locations
                .into_iter()
                .map(|(region, location)| (region.to_string(), location.to_string()))
                .collect(),
        }
    }
}

impl PricingTables {
    /// Load tables from a JSON file; omitted sections keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            JobCostError::Config(format!(
                "Failed to read pricing tables {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let tables: Self = serde_json::from_str(content)
            .map_err(|e| JobCostError::Config(format!("Failed to parse pricing tables: {}", e)))?;
        tables.validate()?;
        Ok(tables)
    }

    /// Reject tables that would silently produce wrong costs
    pub fn validate(&self) -> Result<()> {
        if let Some((worker_type, dpu)) = self
            .worker_capacity
            .iter()
            .find(|(_, dpu)| !(dpu.is_finite() && **dpu > 0.0))
        {
            return Err(JobCostError::Config(format!(
                "capacity for worker type {} must be positive, got {}",
                worker_type, dpu
            )));
        }

        let prices = self
            .worker_price_per_hour
            .values()
            .chain(std::iter::once(&self.default_worker_price_per_hour))
            .chain(self.instance_price_per_hour.values().flat_map(|m| m.values()))
            .chain(self.service_fee_per_hour.values().flat_map(|m| m.values()));
        for price in prices {
            if !(price.is_finite() && *price >= 0.0) {
                return Err(JobCostError::Config(format!(
                    "prices must be non-negative, got {}",
                    price
                )));
            }
        }
        Ok(())
    }

    pub fn worker_capacity(&self, worker_type: &str) -> Option<f64> {
        self.worker_capacity.get(worker_type).copied()
    }

    pub fn worker_price(&self, region: &str) -> Option<f64> {
        self.worker_price_per_hour.get(region).copied()
    }

    pub fn instance_price(&self, region: &str, instance_type: &str) -> Option<f64> {
        self.instance_price_per_hour
            .get(region)
            .and_then(|prices| prices.get(instance_type))
            .copied()
    }

    pub fn service_fee(&self, region: &str, instance_type: &str) -> Option<f64> {
        self.service_fee_per_hour
            .get(region)
            .and_then(|fees| fees.get(instance_type))
            .copied()
    }

    /// Catalog location name for a region
    pub fn location(&self, region: &str) -> &str {
        self.region_locations
            .get(region)
            .map(String::as_str)
            .unwrap_or(DEFAULT_LOCATION)
    }
}

fn to_map<const N: usize>(entries: [(&str, f64); N]) -> HashMap<String, f64> {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn to_nested_map<const N: usize, const M: usize>(
    entries: [(&str, [(&str, f64); M]); N],
) -> HashMap<String, HashMap<String, f64>> {
    entries
        .into_iter()
        .map(|(region, prices)| (region.to_string(), to_map(prices)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables() {
        let tables = PricingTables::default();

        assert_eq!(tables.worker_capacity("G.1X"), Some(1.0));
        assert_eq!(tables.worker_capacity("G.025X"), Some(0.25));
        assert_eq!(tables.worker_capacity("X.999"), None);
        assert_eq!(tables.worker_price("us-west-1"), Some(0.50));
        assert_eq!(tables.instance_price("us-east-1", "m5.xlarge"), Some(0.192));
        assert_eq!(tables.service_fee("sa-east-1", "m5.2xlarge"), Some(0.060));
        assert_eq!(tables.instance_price("eu-west-1", "m5.xlarge"), None);
        assert!(tables.validate().is_ok());
    }

    #[test]
    fn test_location_mapping() {
        let tables = PricingTables::default();
        assert_eq!(tables.location("us-west-1"), "US West (N. California)");
        assert_eq!(tables.location("ap-south-1"), DEFAULT_LOCATION);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tables = PricingTables::from_json_str(
            r#"{"worker_price_per_hour": {"eu-west-1": 0.48}}"#,
        )
        .unwrap();

        assert_eq!(tables.worker_price("eu-west-1"), Some(0.48));
        assert_eq!(tables.worker_price("us-east-1"), None);
        assert_eq!(tables.worker_capacity("G.2X"), Some(2.0));
        assert_eq!(tables.default_worker_price_per_hour, DEFAULT_WORKER_PRICE_PER_HOUR);
    }

    #[test]
    fn test_invalid_tables_rejected() {
        let err = PricingTables::from_json_str(r#"{"worker_capacity": {"G.1X": 0.0}}"#)
            .unwrap_err();
        assert!(matches!(err, JobCostError::Config(_)));

        let err = PricingTables::from_json_str(
            r#"{"service_fee_per_hour": {"us-east-1": {"m5.xlarge": -0.1}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, JobCostError::Config(_)));

        assert!(PricingTables::from_json_str("not json").is_err());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = PricingTables::from_json_file("/nonexistent/pricing.json").unwrap_err();
        assert!(matches!(err, JobCostError::Config(_)));
    }
}
