//! Bounded in-memory unit price cache
//!
//! Prices are pure functions of (region, resource class), so entries never
//! expire within a process run. The cache only evicts to stay under its
//! capacity.

use dashmap::DashMap;
use jobcost_common::{ResourceClass, UnitPrice};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Cache key components
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct CacheKey {
    pub region: String,
    pub resource_class: ResourceClass,
}

impl CacheKey {
    pub fn new(region: &str, resource_class: &ResourceClass) -> Self {
        Self {
            region: region.to_string(),
            resource_class: resource_class.clone(),
        }
    }
}

/// Concurrency-safe bounded price cache using DashMap
pub struct PriceCache {
    entries: DashMap<CacheKey, UnitPrice>,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PriceCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Get a cached price, counting the hit or miss
    pub fn get(&self, key: &CacheKey) -> Option<UnitPrice> {
        match self.entries.get(key) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(
                    region = %key.region,
                    resource_class = %key.resource_class,
                    "Price cache hit"
                );
                Some(entry.value().clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Return the cached price or compute and store it
    ///
    /// `resolve` runs without holding any shard lock, so a slow remote lookup
    /// never blocks readers of other keys. When two callers race on the same
    /// key the first stored value wins and both receive it.
    pub fn get_or_insert_with<F>(&self, key: CacheKey, resolve: F) -> UnitPrice
    where
        F: FnOnce() -> UnitPrice,
    {
        if let Some(price) = self.get(&key) {
            return price;
        }

        let price = resolve();
        self.make_room(&key);
        self.entries.entry(key).or_insert(price).value().clone()
    }

    fn make_room(&self, incoming: &CacheKey) {
        if self.entries.len() < self.max_entries || self.entries.contains_key(incoming) {
            return;
        }
        let victim = self.entries.iter().next().map(|entry| entry.key().clone());
        if let Some(victim) = victim {
            self.entries.remove(&victim);
            debug!(
                region = %victim.region,
                resource_class = %victim.resource_class,
                "Evicted cached price"
            );
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.entries.len() as u64,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Number of cached entries
    pub entry_count: u64,
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that had to resolve a price
    pub misses: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobcost_common::PriceSource;
    use std::cell::Cell;

    fn price(region: &str, instance_type: &str, value: f64) -> UnitPrice {
        UnitPrice::new(
            region,
            ResourceClass::InstanceType(instance_type.to_string()),
            value,
            PriceSource::Remote,
        )
    }

    fn key(region: &str, instance_type: &str) -> CacheKey {
        CacheKey::new(region, &ResourceClass::InstanceType(instance_type.to_string()))
    }

    #[test]
    fn test_resolves_once() {
        let cache = PriceCache::new(8);
        let calls = Cell::new(0);

        let first = cache.get_or_insert_with(key("us-east-1", "m5.xlarge"), || {
            calls.set(calls.get() + 1);
            price("us-east-1", "m5.xlarge", 0.192)
        });
        let second = cache.get_or_insert_with(key("us-east-1", "m5.xlarge"), || {
            calls.set(calls.get() + 1);
            price("us-east-1", "m5.xlarge", 9.99)
        });

        assert_eq!(calls.get(), 1);
        assert_eq!(first, second);
        assert_eq!(cache.stats(), CacheStats { entry_count: 1, hits: 1, misses: 1 });
    }

    #[test]
    fn test_key_includes_region_and_class() {
        let cache = PriceCache::new(8);
        cache.get_or_insert_with(key("us-east-1", "m5.xlarge"), || {
            price("us-east-1", "m5.xlarge", 0.192)
        });
        cache.get_or_insert_with(key("us-west-1", "m5.xlarge"), || {
            price("us-west-1", "m5.xlarge", 0.2)
        });

        let worker_key = CacheKey::new("us-east-1", &ResourceClass::WorkerType("m5.xlarge".into()));
        assert!(cache.get(&worker_key).is_none());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_eviction_keeps_bound() {
        let cache = PriceCache::new(2);

        for i in 0..5 {
            let instance_type = format!("m5.{}xlarge", i);
            cache.get_or_insert_with(key("us-east-1", &instance_type), || {
                price("us-east-1", &instance_type, 0.1)
            });
        }

        assert!(cache.len() <= 2);
        assert_eq!(cache.capacity(), 2);
    }
}
