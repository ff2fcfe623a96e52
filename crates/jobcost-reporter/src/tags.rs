//! Metric tag construction
//!
//! Tags are low-cardinality by construction: only identifiers drawn from
//! small bounded sets (customer, environment, status, region, resource
//! classes, release label) are ever emitted. Free-text job metadata such as
//! job names never becomes a tag.

use jobcost_common::{JobEnvironment, TagSet, UsageRecord};

/// Value used when a tag source is missing
pub const UNKNOWN: &str = "unknown";

/// Build the tag set for one report
///
/// Order: customer, job type, status, region, then environment-specific
/// tags (worker type for batch workers; instance types and release label
/// for clusters).
pub fn build_tags(
    customer_id: &str,
    environment: JobEnvironment,
    record: &UsageRecord,
    success: bool,
) -> TagSet {
    let mut tags = TagSet::new();
    tags.push("customer", customer_id);
    tags.push("job_type", environment.as_str());
    tags.push("status", if success { "success" } else { "failed" });
    tags.push("region", record.region().unwrap_or(UNKNOWN));

    match record {
        UsageRecord::BatchWorker(usage) => {
            let worker_type = usage.worker_type.trim();
            let worker_type = if worker_type.is_empty() { UNKNOWN } else { worker_type };
            tags.push("glue_worker_type", worker_type);
        }
        UsageRecord::Cluster(usage) => {
            let instance_types: Vec<&str> = usage.active_instance_types().collect();
            if !instance_types.is_empty() {
                tags.push("emr_instance_types", &instance_types.join(","));
            }
            if let Some(label) = usage
                .release_label
                .as_deref()
                .map(str::trim)
                .filter(|label| !label.is_empty())
            {
                tags.push("emr_release_label", label);
            }
        }
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobcost_common::{BatchWorkerUsage, ClusterUsage};

    #[test]
    fn test_batch_worker_tags() {
        let record = UsageRecord::from(BatchWorkerUsage::new("us-east-1", "G.1X", 2));
        let tags = build_tags("12345678000190", JobEnvironment::Glue, &record, true);

        assert_eq!(
            tags.as_slice(),
            &[
                "customer:12345678000190",
                "job_type:glue",
                "status:success",
                "region:us-east-1",
                "glue_worker_type:G.1X",
            ]
        );
    }

    #[test]
    fn test_cluster_tags_sorted_and_filtered() {
        let record = UsageRecord::from(
            ClusterUsage::new("sa-east-1")
                .with_instances("r5.2xlarge", 2)
                .with_instances("m5.xlarge", 3)
                .with_instances("c5.large", 0)
                .with_release_label("emr-6.15.0"),
        );
        let tags = build_tags("acme", JobEnvironment::Emr, &record, false);

        assert_eq!(
            tags.as_slice(),
            &[
                "customer:acme",
                "job_type:emr",
                "status:failed",
                "region:sa-east-1",
                "emr_instance_types:m5.xlarge,r5.2xlarge",
                "emr_release_label:emr-6.15.0",
            ]
        );
    }

    #[test]
    fn test_empty_cluster_omits_optional_tags() {
        let record = UsageRecord::from(ClusterUsage::new("us-east-1").with_release_label(""));
        let tags = build_tags("acme", JobEnvironment::Emr, &record, true);

        assert_eq!(tags.len(), 4);
        assert_eq!(tags.get("emr_instance_types"), None);
        assert_eq!(tags.get("emr_release_label"), None);
    }

    #[test]
    fn test_missing_values_fall_back_to_unknown() {
        let record = UsageRecord::from(BatchWorkerUsage::new("", "", 1));
        let tags = build_tags("acme", JobEnvironment::Glue, &record, true);

        assert_eq!(tags.get("region"), Some(UNKNOWN));
        assert_eq!(tags.get("glue_worker_type"), Some(UNKNOWN));
    }

    #[test]
    fn test_ordering_is_deterministic() {
        let record = UsageRecord::from(
            ClusterUsage::new("us-east-1")
                .with_instances("m5.2xlarge", 1)
                .with_instances("m5.xlarge", 1),
        );
        let first = build_tags("acme", JobEnvironment::Emr, &record, true);
        let second = build_tags("acme", JobEnvironment::Emr, &record, true);

        assert_eq!(first, second);
    }
}
