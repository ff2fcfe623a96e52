//! Error types for jobcost
//!
//! Provides a unified error type and the pricing-specific error variants.
//! Correctness failures (configuration, unknown capacity keys, invalid input)
//! propagate to callers; availability failures are recovered by the price
//! catalog and only surface in logs.

use thiserror::Error;

/// Result type alias using JobCostError
pub type Result<T> = std::result::Result<T, JobCostError>;

/// Unified error type for jobcost operations
#[derive(Debug, Error)]
pub enum JobCostError {
    // Missing credential, region or customer
    #[error("Configuration error: {0}")]
    Config(String),

    // Input outside the documented domain (negative duration, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    // Pricing errors
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    // Metrics backend rejected or was unreachable
    #[error("Metric submission error: {0}")]
    MetricSubmission(String),

    // Network errors
    #[error("Network error: {0}")]
    Network(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl JobCostError {
    /// Whether the error came from an unrecognized capacity-multiplier key
    pub fn is_unknown_resource_class(&self) -> bool {
        matches!(
            self,
            JobCostError::Pricing(PricingError::UnknownResourceClass { .. })
        )
    }
}

/// Pricing lookup and cost calculation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    #[error("Unknown resource class: {resource_class}")]
    UnknownResourceClass { resource_class: String },

    #[error("Price lookup degraded for {resource_class} in {region}: {reason}")]
    LookupDegraded {
        region: String,
        resource_class: String,
        reason: String,
    },

    #[error("No price available for {resource_class} in {region}")]
    PriceUnavailable {
        region: String,
        resource_class: String,
    },

    #[error("Price extraction failed: {0}")]
    Extraction(String),

    #[error("Pricing catalog request failed: {0}")]
    Catalog(String),
}

impl PricingError {
    /// Transport failures are worth retrying; everything else is deterministic
    pub fn is_transient(&self) -> bool {
        matches!(self, PricingError::Catalog(_))
    }
}

// Implement From for common external error types
impl From<serde_json::Error> for JobCostError {
    fn from(err: serde_json::Error) -> Self {
        JobCostError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = JobCostError::Pricing(PricingError::UnknownResourceClass {
            resource_class: "X.999".to_string(),
        });
        assert!(err.to_string().contains("X.999"));
        assert!(err.is_unknown_resource_class());
    }

    #[test]
    fn test_transient_classification() {
        assert!(PricingError::Catalog("connection reset".into()).is_transient());
        assert!(!PricingError::Extraction("no Hrs dimension".into()).is_transient());
        assert!(!PricingError::PriceUnavailable {
            region: "us-east-1".into(),
            resource_class: "m5.xlarge".into(),
        }
        .is_transient());
    }

    #[test]
    fn test_degraded_display() {
        let err = PricingError::LookupDegraded {
            region: "sa-east-1".to_string(),
            resource_class: "m5.2xlarge".to_string(),
            reason: "retries exhausted".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("sa-east-1"));
        assert!(msg.contains("retries exhausted"));
    }

    #[test]
    fn test_json_error_maps_to_serialization() {
        let err: JobCostError = serde_json::from_str::<u32>("not a number").unwrap_err().into();
        assert!(matches!(err, JobCostError::Serialization(_)));
    }
}
