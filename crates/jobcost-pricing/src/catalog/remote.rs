//! Remote pricing catalog interface
//!
//! The catalog answers a product query with a list of product documents, each
//! a JSON string shaped like:
//!
//! ```text
//! {
//!   "product": { ... },
//!   "terms": {
//!     "OnDemand": {
//!       "<offer>": {
//!         "priceDimensions": {
//!           "<rate>": { "unit": "Hrs", "pricePerUnit": { "USD": "0.1920000000" } }
//!         }
//!       }
//!     }
//!   }
//! }
//! ```

use jobcost_common::PricingError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Service code of on-demand compute instances
pub const COMPUTE_SERVICE_CODE: &str = "AmazonEC2";

/// Unit of hourly price dimensions
pub const HOURLY_UNIT: &str = "Hrs";

/// Source of on-demand product prices
#[cfg_attr(test, mockall::automock)]
pub trait RemotePriceSource: Send + Sync {
    /// Fetch product documents matching the query
    fn get_products(&self, query: &ProductQuery) -> Result<Vec<String>, PricingError>;
}

/// Exact-match filter on one product attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermFilter {
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Field")]
    pub field: String,
    #[serde(rename = "Value")]
    pub value: String,
}

impl TermFilter {
    pub fn term_match(field: &str, value: &str) -> Self {
        Self {
            kind: "TERM_MATCH".to_string(),
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// On-demand Linux instance price query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuery {
    pub service_code: String,
    /// Catalog location name (e.g. "US East (N. Virginia)")
    pub location: String,
    pub instance_type: String,
    pub operating_system: String,
    pub pre_installed_software: String,
    pub tenancy: String,
}

impl ProductQuery {
    /// Shared-tenancy Linux instance without pre-installed software
    pub fn on_demand_linux(location: impl Into<String>, instance_type: impl Into<String>) -> Self {
        Self {
            service_code: COMPUTE_SERVICE_CODE.to_string(),
            location: location.into(),
            instance_type: instance_type.into(),
            operating_system: "Linux".to_string(),
            pre_installed_software: "NA".to_string(),
            tenancy: "Shared".to_string(),
        }
    }

    /// Query rendered as catalog filters
    pub fn filters(&self) -> Vec<TermFilter> {
        vec![
            TermFilter::term_match("ServiceCode", &self.service_code),
            TermFilter::term_match("location", &self.location),
            TermFilter::term_match("instanceType", &self.instance_type),
            TermFilter::term_match("operatingSystem", &self.operating_system),
            TermFilter::term_match("preInstalledSw", &self.pre_installed_software),
            TermFilter::term_match("tenancy", &self.tenancy),
        ]
    }
}

/// Extract the on-demand hourly USD price from a product document
///
/// Walks `terms.OnDemand.*.priceDimensions.*` in document order and returns
/// the USD price of the first dimension whose unit is `Hrs`. Other dimensions
/// (GB-Mo, ...) are ignored.
pub fn extract_hourly_price(product_json: &str) -> Result<f64, PricingError> {
    let document: Value = serde_json::from_str(product_json)
        .map_err(|e| PricingError::Extraction(format!("invalid product document: {}", e)))?;

    let offers = document
        .pointer("/terms/OnDemand")
        .and_then(Value::as_object)
        .ok_or_else(|| PricingError::Extraction("no on-demand terms in product".to_string()))?;

    let hourly = offers
        .values()
        .filter_map(|offer| offer.get("priceDimensions").and_then(Value::as_object))
        .flat_map(|dimensions| dimensions.values())
        .find(|dimension| dimension.get("unit").and_then(Value::as_str) == Some(HOURLY_UNIT))
        .ok_or_else(|| {
            PricingError::Extraction(format!("price with unit '{}' not found", HOURLY_UNIT))
        })?;

    let usd = hourly
        .pointer("/pricePerUnit/USD")
        .ok_or_else(|| PricingError::Extraction("hourly dimension has no USD price".to_string()))?;

    let price = match usd {
        Value::String(s) => s.trim().parse::<f64>().map_err(|e| {
            PricingError::Extraction(format!("unparseable USD price '{}': {}", s, e))
        })?,
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| PricingError::Extraction(format!("unrepresentable USD price {}", n)))?,
        other => {
            return Err(PricingError::Extraction(format!(
                "unexpected USD price value {}",
                other
            )))
        }
    };

    if !(price.is_finite() && price >= 0.0) {
        return Err(PricingError::Extraction(format!(
            "USD price must be non-negative, got {}",
            price
        )));
    }
    Ok(price)
}
