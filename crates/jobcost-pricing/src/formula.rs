//! Cost formulas
//!
//! ```text
//! batch worker:  cost = workers × DPU per worker × hours × price per DPU-hour
//! cluster:       cost = Σ (instance price + service fee) × count × hours
//! ```
//!
//! Both formulas are pure. A zero duration costs nothing, and non-negative
//! inputs never produce a negative cost.

use jobcost_common::{JobCostError, JobDuration, PricingError, Result};
use std::collections::HashMap;

/// Capacity units (DPUs) per worker of the given type
///
/// An unknown worker type is a hard error: the multiplier scales the cost by
/// an unbounded factor, so no default is safe.
pub fn dpu_equivalent(capacity: &HashMap<String, f64>, worker_type: &str) -> Result<f64> {
    capacity
        .get(worker_type)
        .copied()
        .filter(|dpu| dpu.is_finite() && *dpu > 0.0)
        .ok_or_else(|| {
            JobCostError::Pricing(PricingError::UnknownResourceClass {
                resource_class: worker_type.to_string(),
            })
        })
}

/// Batch-worker job cost
pub fn batch_worker_cost(
    worker_count: u32,
    dpu_per_worker: f64,
    duration: JobDuration,
    price_per_dpu_hour: f64,
) -> f64 {
    non_negative(worker_count as f64 * dpu_per_worker * duration.hours() * price_per_dpu_hour)
}

/// One instance type of a cluster job
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterLine {
    pub count: u32,
    pub price_per_hour: f64,
    pub fee_per_hour: f64,
}

impl ClusterLine {
    pub fn cost(&self, duration: JobDuration) -> f64 {
        non_negative(
            (self.price_per_hour + self.fee_per_hour) * self.count as f64 * duration.hours(),
        )
    }
}

/// Cluster job cost; an empty cluster costs 0.0
pub fn cluster_cost<I>(lines: I, duration: JobDuration) -> f64
where
    I: IntoIterator<Item = ClusterLine>,
{
    non_negative(lines.into_iter().map(|line| line.cost(duration)).sum())
}

fn non_negative(value: f64) -> f64 {
    if value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hours(h: f64) -> JobDuration {
        JobDuration::from_seconds(h * 3600.0).unwrap()
    }

    fn capacity() -> HashMap<String, f64> {
        [("G.1X".to_string(), 1.0), ("G.2X".to_string(), 2.0)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_dpu_lookup() {
        assert_eq!(dpu_equivalent(&capacity(), "G.2X").unwrap(), 2.0);

        let err = dpu_equivalent(&capacity(), "X.999").unwrap_err();
        assert!(err.is_unknown_resource_class());
    }

    #[test]
    fn test_batch_worker_cost() {
        // 2 workers × 1 DPU × 1 hour × $0.44
        let cost = batch_worker_cost(2, 1.0, hours(1.0), 0.44);
        assert!((cost - 0.88).abs() < 1e-9);

        // 10 workers × 2 DPU × 0.25 hour × $0.50
        let cost = batch_worker_cost(10, 2.0, hours(0.25), 0.50);
        assert!((cost - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_cluster_cost() {
        let lines = [ClusterLine {
            count: 3,
            price_per_hour: 0.192,
            fee_per_hour: 0.022,
        }];
        let cost = cluster_cost(lines, hours(0.5));
        assert!((cost - 0.321).abs() < 1e-9);
    }

    #[test]
    fn test_cluster_cost_sums_lines() {
        let lines = vec![
            ClusterLine {
                count: 1,
                price_per_hour: 0.768,
                fee_per_hour: 0.05,
            },
            ClusterLine {
                count: 2,
                price_per_hour: 0.192,
                fee_per_hour: 0.022,
            },
        ];
        let cost = cluster_cost(lines, hours(2.0));
        assert!((cost - (0.818 * 2.0 + 0.214 * 2.0 * 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_zero_duration_is_free() {
        assert_eq!(batch_worker_cost(50, 8.0, JobDuration::ZERO, 0.44), 0.0);
        let line = ClusterLine {
            count: 10,
            price_per_hour: 1.0,
            fee_per_hour: 0.06,
        };
        assert_eq!(cluster_cost([line], JobDuration::ZERO), 0.0);
    }

    proptest! {
        #[test]
        fn batch_worker_cost_matches_product(
            workers in 0u32..10_000,
            dpu in 0.25f64..128.0,
            seconds in 0.0f64..1_000_000.0,
            price in 0.0f64..10.0,
        ) {
            let duration = JobDuration::from_seconds(seconds).unwrap();
            let cost = batch_worker_cost(workers, dpu, duration, price);
            let expected = workers as f64 * dpu * (seconds / 3600.0) * price;

            prop_assert!(cost >= 0.0);
            prop_assert!((cost - expected).abs() <= 1e-9 * expected.max(1.0));
        }

        #[test]
        fn empty_cluster_is_free(seconds in 0.0f64..1_000_000.0) {
            let duration = JobDuration::from_seconds(seconds).unwrap();
            prop_assert_eq!(cluster_cost(Vec::<ClusterLine>::new(), duration), 0.0);
        }

        #[test]
        fn cluster_cost_is_non_negative(
            counts in proptest::collection::vec(0u32..500, 0..8),
            price in 0.0f64..30.0,
            fee in 0.0f64..1.0,
            seconds in 0.0f64..1_000_000.0,
        ) {
            let duration = JobDuration::from_seconds(seconds).unwrap();
            let lines = counts.into_iter().map(|count| ClusterLine {
                count,
                price_per_hour: price,
                fee_per_hour: fee,
            });
            prop_assert!(cluster_cost(lines, duration) >= 0.0);
        }

        #[test]
        fn zero_duration_costs_nothing(
            workers in 0u32..10_000,
            dpu in 0.25f64..128.0,
            price in 0.0f64..10.0,
        ) {
            prop_assert_eq!(batch_worker_cost(workers, dpu, JobDuration::ZERO, price), 0.0);
        }
    }
}
