use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Storage seam for the result cache.
///
/// Implementations own serialization-agnostic bytes; compression is an
/// implementation detail and `get` always returns the original payload.
/// All methods are infallible at the trait boundary: storage faults are
/// contained by the implementation and surface as misses.
pub trait CacheStore: Send + Sync {
    /// Fetch a value, honoring lazy TTL expiry and touching LRU metadata.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store a value with the given TTL, evicting LRU entries as needed.
    fn set(&self, key: &str, value: &[u8], ttl: Duration);

    /// Batch get; result positions correspond to `keys`.
    fn mget(&self, keys: &[&str]) -> Vec<Option<Vec<u8>>> {
        keys.iter().map(|k| self.get(k)).collect()
    }

    /// Batch set with a shared TTL.
    fn mset(&self, entries: &[(&str, &[u8])], ttl: Duration) {
        for (key, value) in entries {
            self.set(key, value, ttl);
        }
    }

    /// Remove a single entry. Returns whether it existed.
    fn remove(&self, key: &str) -> bool;

    /// Drop entries whose TTL has passed; returns how many were removed.
    /// Called from the maintenance loop on a fixed interval.
    fn sweep_expired(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn stats(&self) -> CacheStatsSnapshot;
}

/// Process-wide cache counters.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    bytes_saved_by_compression: AtomicU64,
}

impl CacheStats {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bytes_saved(&self, bytes: u64) {
        self.bytes_saved_by_compression.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            bytes_saved_by_compression: self.bytes_saved_by_compression.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`CacheStats`], handed to the observability sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub bytes_saved_by_compression: u64,
}

impl CacheStatsSnapshot {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
