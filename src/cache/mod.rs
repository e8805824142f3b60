//! Pairwise distance cache
//!
//! LRU cache for distances between pool instances, used while the k-NN
//! learner builds its neighbour matrix. Distances are symmetric, so only
//! d(i, j) with i <= j is stored.

use lru::LruCache;
use std::num::NonZeroUsize;

/// Cache key for pairwise distances, normalized so that i <= j
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PairKey {
    i: usize,
    j: usize,
}

impl PairKey {
    fn new(i: usize, j: usize) -> Self {
        if i <= j {
            Self { i, j }
        } else {
            Self { i: j, j: i }
        }
    }
}

/// LRU cache for symmetric pairwise distances
pub struct DistanceCache {
    cache: LruCache<PairKey, f64>,
    hits: u64,
    misses: u64,
}

impl DistanceCache {
    /// Create a cache with the given capacity in entries
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self {
            cache: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Get a cached distance
    pub fn get(&mut self, i: usize, j: usize) -> Option<f64> {
        let key = PairKey::new(i, j);
        if let Some(&value) = self.cache.get(&key) {
            self.hits += 1;
            Some(value)
        } else {
            self.misses += 1;
            None
        }
    }

    /// Store a distance
    pub fn put(&mut self, i: usize, j: usize, value: f64) {
        self.cache.put(PairKey::new(i, j), value);
    }

    /// Cached distance, or the result of `compute` (stored on the way out)
    pub fn get_or_compute(&mut self, i: usize, j: usize, compute: impl FnOnce() -> f64) -> f64 {
        if let Some(value) = self.get(i, j) {
            return value;
        }
        let value = compute();
        self.put(i, j, value);
        value
    }

    /// Fraction of lookups served from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            capacity: self.cache.cap().get(),
            size: self.cache.len(),
        }
    }

    /// Drop all entries and reset the counters
    pub fn clear(&mut self) {
        self.cache.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub capacity: usize,
    pub size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_normalization() {
        let key1 = PairKey::new(1, 5);
        let key2 = PairKey::new(5, 1);
        assert_eq!(key1, key2);
        assert_eq!(key1.i, 1);
        assert_eq!(key1.j, 5);
    }

    #[test]
    fn test_symmetric_access() {
        let mut cache = DistanceCache::new(4);
        assert_eq!(cache.get(0, 1), None);
        cache.put(0, 1, 5.0);
        assert_eq!(cache.get(0, 1), Some(5.0));
        assert_eq!(cache.get(1, 0), Some(5.0));
        assert_eq!(cache.stats().hits, 2);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_get_or_compute() {
        let mut cache = DistanceCache::new(4);
        let mut computed = 0;
        let value = cache.get_or_compute(2, 7, || {
            computed += 1;
            1.5
        });
        assert_eq!(value, 1.5);
        let again = cache.get_or_compute(7, 2, || {
            computed += 1;
            9.9
        });
        assert_eq!(again, 1.5);
        assert_eq!(computed, 1);
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = DistanceCache::new(2);
        cache.put(0, 1, 1.0);
        cache.put(1, 2, 2.0);
        cache.put(2, 3, 3.0); // evicts (0,1)
        assert_eq!(cache.get(0, 1), None);
        assert_eq!(cache.get(1, 2), Some(2.0));
        assert_eq!(cache.get(2, 3), Some(3.0));
    }

    #[test]
    fn test_clear() {
        let mut cache = DistanceCache::new(4);
        cache.put(0, 1, 1.0);
        cache.get(0, 1);
        cache.clear();
        assert_eq!(cache.get(0, 1), None);
        assert_eq!(cache.stats().hits, 0);
    }
}
