//! TTL/LRU result cache with transparent compression.
//!
//! The byte-level [`CacheStore`] trait is the storage seam: this crate ships
//! the in-memory [`MemoryCache`], but the TTL, eviction, and statistics
//! contracts are defined on the trait so a backend built on an embedded
//! database or a remote KV store can slot in unchanged.
//!
//! [`ResultCache`] is the typed layer the admission pipeline uses: values go
//! through `serde_json`, and payloads above the configured threshold are
//! gzip-compressed on the way in. Cache faults of any kind degrade to a miss;
//! they never fail a request.

pub mod compression;
mod key;
mod memory;
mod store;
mod typed;

pub use key::cache_key;
pub use memory::MemoryCache;
pub use store::{CacheStats, CacheStatsSnapshot, CacheStore};
pub use typed::ResultCache;
