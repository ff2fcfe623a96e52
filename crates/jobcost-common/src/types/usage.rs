//! Resource usage records
//!
//! A usage record describes what one job run consumed. The variant decides
//! which cost formula applies:
//! - BatchWorker: a fixed pool of typed workers (Glue)
//! - Cluster: a mix of instance types (EMR)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Job execution environment, derived from the usage record variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobEnvironment {
    /// Serverless batch workers billed per DPU-hour
    Glue,
    /// Managed cluster billed per instance-hour plus service fee
    Emr,
}

impl JobEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobEnvironment::Glue => "glue",
            JobEnvironment::Emr => "emr",
        }
    }
}

impl fmt::Display for JobEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Usage of a batch-worker job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchWorkerUsage {
    /// Cloud region (e.g. "us-east-1")
    pub region: String,
    /// Worker type key (e.g. "G.1X")
    pub worker_type: String,
    /// Number of workers allocated to the job
    pub worker_count: u32,
}

impl BatchWorkerUsage {
    pub fn new(
        region: impl Into<String>,
        worker_type: impl Into<String>,
        worker_count: u32,
    ) -> Self {
        Self {
            region: region.into(),
            worker_type: worker_type.into(),
            worker_count,
        }
    }
}

/// Usage of a cluster job
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClusterUsage {
    /// Cloud region
    pub region: String,
    /// Running instance count per instance type
    #[serde(default)]
    pub instance_counts: BTreeMap<String, u32>,
    /// Cluster release label (e.g. "emr-6.15.0")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_label: Option<String>,
}

impl ClusterUsage {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Default::default()
        }
    }

    /// Add instances of a type, accumulating counts across instance groups
    pub fn with_instances(mut self, instance_type: impl Into<String>, count: u32) -> Self {
        let total = self.instance_counts.entry(instance_type.into()).or_insert(0);
        *total = total.saturating_add(count);
        self
    }

    pub fn with_release_label(mut self, label: impl Into<String>) -> Self {
        self.release_label = Some(label.into());
        self
    }

    /// Instance types with at least one running instance, sorted
    pub fn active_instance_types(&self) -> impl Iterator<Item = &str> {
        self.instance_counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(instance_type, _)| instance_type.as_str())
    }
}

/// Resource usage record for one job run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "environment", rename_all = "snake_case")]
pub enum UsageRecord {
    #[serde(rename = "glue")]
    BatchWorker(BatchWorkerUsage),
    #[serde(rename = "emr")]
    Cluster(ClusterUsage),
}

impl UsageRecord {
    pub fn environment(&self) -> JobEnvironment {
        match self {
            UsageRecord::BatchWorker(_) => JobEnvironment::Glue,
            UsageRecord::Cluster(_) => JobEnvironment::Emr,
        }
    }

    /// Region of the job, `None` when the collector could not determine it
    pub fn region(&self) -> Option<&str> {
        let region = match self {
            UsageRecord::BatchWorker(usage) => usage.region.as_str(),
            UsageRecord::Cluster(usage) => usage.region.as_str(),
        };
        let region = region.trim();
        (!region.is_empty()).then_some(region)
    }
}

impl From<BatchWorkerUsage> for UsageRecord {
    fn from(usage: BatchWorkerUsage) -> Self {
        UsageRecord::BatchWorker(usage)
    }
}

impl From<ClusterUsage> for UsageRecord {
    fn from(usage: ClusterUsage) -> Self {
        UsageRecord::Cluster(usage)
    }
}

/// Priced resource class; together with the region it keys the price caches
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ResourceClass {
    /// Batch worker type, priced per DPU-hour
    WorkerType(String),
    /// Compute instance type, priced per instance-hour
    InstanceType(String),
}

impl ResourceClass {
    pub fn name(&self) -> &str {
        match self {
            ResourceClass::WorkerType(name) | ResourceClass::InstanceType(name) => name,
        }
    }
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_json_shape() {
        let json = r#"{"environment": "glue", "region": "us-east-1",
                       "worker_type": "G.1X", "worker_count": 2}"#;
        let record: UsageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.environment(), JobEnvironment::Glue);
        assert_eq!(
            record,
            UsageRecord::BatchWorker(BatchWorkerUsage::new("us-east-1", "G.1X", 2))
        );

        let json = r#"{"environment": "emr", "region": "us-east-1",
                       "instance_counts": {"m5.xlarge": 3}}"#;
        let record: UsageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.environment(), JobEnvironment::Emr);
        match record {
            UsageRecord::Cluster(usage) => {
                assert_eq!(usage.instance_counts.get("m5.xlarge"), Some(&3));
                assert!(usage.release_label.is_none());
            }
            _ => panic!("expected cluster record"),
        }
    }

    #[test]
    fn test_blank_region_is_absent() {
        let record = UsageRecord::from(BatchWorkerUsage::new("  ", "G.1X", 1));
        assert_eq!(record.region(), None);

        let record = UsageRecord::from(ClusterUsage::new("sa-east-1"));
        assert_eq!(record.region(), Some("sa-east-1"));
    }

    #[test]
    fn test_instance_groups_accumulate() {
        let usage = ClusterUsage::new("us-east-1")
            .with_instances("m5.xlarge", 1)
            .with_instances("m5.xlarge", 2)
            .with_instances("m5.2xlarge", 0);

        assert_eq!(usage.instance_counts.get("m5.xlarge"), Some(&3));
        let active: Vec<_> = usage.active_instance_types().collect();
        assert_eq!(active, vec!["m5.xlarge"]);
    }

    #[test]
    fn test_instance_counts_saturate() {
        let usage = ClusterUsage::new("us-east-1")
            .with_instances("m5.xlarge", u32::MAX)
            .with_instances("m5.xlarge", 5);

        assert_eq!(usage.instance_counts.get("m5.xlarge"), Some(&u32::MAX));
    }
}
