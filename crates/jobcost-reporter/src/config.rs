//! Reporter configuration
//!
//! Loaded from, in increasing precedence:
//! 1. built-in defaults
//! 2. an optional config file (`jobcost.toml`, or the path in `JOBCOST_CONFIG`)
//! 3. `JOBCOST__*` environment variables (`__` separates nested keys)
//! 4. `DATADOG_API_KEY` / `DATADOG_APP_KEY` and the standard `AWS_*`
//!    credential variables when no value was set above

use crate::sigv4::AwsCredentials;
use jobcost_common::{JobCostError, Result};
use jobcost_pricing::{PricingTables, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default metric name prefix (`aws.job.cost`, `aws.job.duration`)
pub const DEFAULT_METRIC_PREFIX: &str = "aws";

/// Default Datadog API site
pub const DEFAULT_DATADOG_SITE: &str = "https://api.datadoghq.com";

/// Price List Query API endpoint
pub const DEFAULT_PRICING_ENDPOINT: &str = "https://api.pricing.us-east-1.amazonaws.com";

/// Region the Price List API signs requests for
pub const DEFAULT_PRICING_REGION: &str = "us-east-1";

/// Reporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// Metrics backend API key; opaque to the cost engine
    pub api_key: Option<String>,
    /// Prefix of the emitted metric names
    pub metric_prefix: String,
    /// Datadog transport settings
    pub datadog: DatadogSettings,
    /// Dynamic instance pricing
    pub pricing: PricingSettings,
    /// Remote price lookup retry schedule
    pub retry: RetryPolicy,
    /// JSON file replacing the built-in pricing tables
    pub pricing_tables_path: Option<PathBuf>,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            metric_prefix: DEFAULT_METRIC_PREFIX.to_string(),
            datadog: DatadogSettings::default(),
            pricing: PricingSettings::default(),
            retry: RetryPolicy::default(),
            pricing_tables_path: None,
        }
    }
}

impl ReporterConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let path = std::env::var("JOBCOST_CONFIG").unwrap_or_else(|_| "jobcost".to_string());
        let required = std::env::var("JOBCOST_CONFIG").is_ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name(&path).required(required))
            .add_source(
                config::Environment::with_prefix("JOBCOST")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .map_err(|e| JobCostError::Config(format!("Failed to load configuration: {}", e)))?;

        let mut cfg: Self = settings
            .try_deserialize()
            .map_err(|e| JobCostError::Config(format!("Invalid configuration: {}", e)))?;

        cfg.apply_env_fallbacks(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Fill unset credentials from the conventional Datadog variables
    pub fn apply_env_fallbacks<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.api_key.as_deref().map_or(true, str::is_empty) {
            self.api_key = lookup("DATADOG_API_KEY").filter(|key| !key.is_empty());
        }
        if self.datadog.app_key.as_deref().map_or(true, str::is_empty) {
            self.datadog.app_key = lookup("DATADOG_APP_KEY").filter(|key| !key.is_empty());
        }

        let pricing = &mut self.pricing;
        for (slot, var) in [
            (&mut pricing.access_key_id, "AWS_ACCESS_KEY_ID"),
            (&mut pricing.secret_access_key, "AWS_SECRET_ACCESS_KEY"),
            (&mut pricing.session_token, "AWS_SESSION_TOKEN"),
        ] {
            if slot.as_deref().map_or(true, str::is_empty) {
                *slot = lookup(var).filter(|value| !value.is_empty());
            }
        }
    }

    /// API key, or a configuration error when missing
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                JobCostError::Config(
                    "Datadog API key must be provided via configuration or DATADOG_API_KEY"
                        .to_string(),
                )
            })
    }

    /// Pricing tables from the configured file, or the built-in defaults
    pub fn pricing_tables(&self) -> Result<PricingTables> {
        match &self.pricing_tables_path {
            Some(path) => PricingTables::from_json_file(path),
            None => Ok(PricingTables::default()),
        }
    }
}

/// Datadog transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatadogSettings {
    /// API base URL
    pub site: String,
    /// Optional application key
    pub app_key: Option<String>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for DatadogSettings {
    fn default() -> Self {
        Self {
            site: DEFAULT_DATADOG_SITE.to_string(),
            app_key: None,
            request_timeout_secs: 10,
        }
    }
}

impl DatadogSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// AWS Price List API settings
///
/// Instance prices come from the static tables unless `enabled` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    pub enabled: bool,
    pub endpoint: String,
    pub signing_region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    /// Products requested per query; only the first is priced
    pub max_results: u32,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: DEFAULT_PRICING_ENDPOINT.to_string(),
            signing_region: DEFAULT_PRICING_REGION.to_string(),
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
            max_results: 1,
            request_timeout_secs: 10,
        }
    }
}

impl PricingSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Signing credentials, or a configuration error when incomplete
    pub fn credentials(&self) -> Result<AwsCredentials> {
        let non_empty = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        match (
            non_empty(&self.access_key_id),
            non_empty(&self.secret_access_key),
        ) {
            (Some(access_key_id), Some(secret_access_key)) => Ok(AwsCredentials {
                access_key_id,
                secret_access_key,
                session_token: non_empty(&self.session_token),
            }),
            _ => Err(JobCostError::Config(
                "Dynamic pricing needs AWS credentials via configuration or \
                 AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY"
                    .to_string(),
            )),
        }
    }
}
