//! In-memory TTL/LRU cache backend.

use ahash::AHashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::compression;
use super::store::{CacheStats, CacheStatsSnapshot, CacheStore};

/// One stored value and its bookkeeping.
#[derive(Debug, Clone)]
struct CacheEntry {
    data: Vec<u8>,
    compressed: bool,
    created_at: Instant,
    ttl: Duration,
    access_count: u64,
    last_access: Instant,
    size_bytes: usize,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= self.ttl
    }
}

#[derive(Debug, Default)]
struct Shelf {
    entries: AHashMap<String, CacheEntry>,
    total_bytes: usize,
}

impl Shelf {
    fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.total_bytes -= entry.size_bytes;
        Some(entry)
    }

    /// Evict the entry with the oldest `last_access`.
    fn evict_lru(&mut self) -> Option<String> {
        let victim = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(key, _)| key.clone())?;
        self.remove(&victim);
        Some(victim)
    }
}

/// Bounded in-memory [`CacheStore`] with lazy TTL expiry, LRU eviction, and
/// gzip compression for payloads above a size threshold.
pub struct MemoryCache {
    shelf: Mutex<Shelf>,
    max_entries: usize,
    max_bytes: usize,
    compression_threshold: usize,
    stats: CacheStats,
}

impl MemoryCache {
    /// # Arguments
    /// * `max_entries` - maximum number of live entries
    /// * `max_bytes` - total stored-byte budget (post-compression sizes)
    /// * `compression_threshold` - payloads at or above this many bytes are
    ///   gzip-compressed before storage
    pub fn new(max_entries: usize, max_bytes: usize, compression_threshold: usize) -> Self {
        Self {
            shelf: Mutex::new(Shelf::default()),
            max_entries,
            max_bytes,
            compression_threshold,
            stats: CacheStats::default(),
        }
    }

    /// Compress when worthwhile; storage must never fail on a bad payload.
    fn pack(&self, value: &[u8]) -> (Vec<u8>, bool) {
        if value.len() < self.compression_threshold {
            return (value.to_vec(), false);
        }
        match compression::compress(value) {
            Ok(packed) if packed.len() < value.len() => (packed, true),
            Ok(_) => (value.to_vec(), false),
            Err(e) => {
                tracing::warn!(error = %e, "cache compression failed, storing uncompressed");
                (value.to_vec(), false)
            }
        }
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let now = Instant::now();
        let mut shelf = match self.shelf.lock() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::warn!("cache lock poisoned, treating as miss");
                self.stats.record_miss();
                return None;
            }
        };

        let expired = match shelf.entries.get(key) {
            None => {
                self.stats.record_miss();
                return None;
            }
            Some(entry) => entry.is_expired(now),
        };

        // Lazy expiry: an unswept entry past its TTL is already absent.
        if expired {
            shelf.remove(key);
            self.stats.record_miss();
            return None;
        }

        let Some(entry) = shelf.entries.get_mut(key) else {
            self.stats.record_miss();
            return None;
        };
        entry.last_access = now;
        entry.access_count += 1;
        let (data, compressed) = (entry.data.clone(), entry.compressed);
        drop(shelf);

        if compressed {
            match compression::decompress(&data) {
                Ok(raw) => {
                    self.stats.record_hit();
                    Some(raw)
                }
                Err(e) => {
                    // Corrupt entry: contain the fault, degrade to a miss.
                    tracing::warn!(key, error = %e, "cache decompression failed, dropping entry");
                    self.remove(key);
                    self.stats.record_miss();
                    None
                }
            }
        } else {
            self.stats.record_hit();
            Some(data)
        }
    }

    fn set(&self, key: &str, value: &[u8], ttl: Duration) {
        let now = Instant::now();
        let (data, compressed) = self.pack(value);
        let size_bytes = data.len();

        if size_bytes > self.max_bytes {
            // A single value larger than the whole budget can never fit.
            tracing::warn!(key, size_bytes, "cache value exceeds byte budget, not storing");
            return;
        }

        let mut shelf = match self.shelf.lock() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::warn!("cache lock poisoned, dropping write");
                return;
            }
        };

        // Replacing an entry frees its budget before eviction math runs.
        shelf.remove(key);

        while !shelf.entries.is_empty()
            && (shelf.entries.len() >= self.max_entries
                || shelf.total_bytes + size_bytes > self.max_bytes)
        {
            if shelf.evict_lru().is_some() {
                self.stats.record_eviction();
            } else {
                break;
            }
        }

        shelf.entries.insert(
            key.to_string(),
            CacheEntry {
                data,
                compressed,
                created_at: now,
                ttl,
                access_count: 0,
                last_access: now,
                size_bytes,
            },
        );
        shelf.total_bytes += size_bytes;

        // Savings count only for writes that actually landed.
        if compressed {
            self.stats.record_bytes_saved((value.len() - size_bytes) as u64);
        }
    }

    fn remove(&self, key: &str) -> bool {
        match self.shelf.lock() {
            Ok(mut shelf) => shelf.remove(key).is_some(),
            Err(_) => false,
        }
    }

    fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut shelf = match self.shelf.lock() {
            Ok(guard) => guard,
            Err(_) => return 0,
        };

        let expired: Vec<String> = shelf
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            shelf.remove(key);
        }

        if !expired.is_empty() {
            tracing::debug!(removed = expired.len(), "swept expired cache entries");
        }
        expired.len()
    }

    fn len(&self) -> usize {
        self.shelf.lock().map(|s| s.entries.len()).unwrap_or(0)
    }

    fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }
}
