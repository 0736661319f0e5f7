//! Typed serde layer over a [`CacheStore`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;

use super::store::{CacheStatsSnapshot, CacheStore};

/// Serde-aware cache handle used by the admission pipeline.
///
/// Decoding faults are contained here: a corrupt or undecodable entry is
/// dropped and reported as a miss, never as an error to the caller.
#[derive(Clone)]
pub struct ResultCache {
    store: Arc<dyn CacheStore>,
}

impl ResultCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = self.store.get(key)?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "undecodable cache entry, dropping");
                self.store.remove(key);
                None
            }
        }
    }

    /// Serialize and store a value. Only serialization of the caller's own
    /// value can fail; storage itself is infallible.
    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.store.set(key, &bytes, ttl);
        Ok(())
    }

    /// Batch get; result positions correspond to `keys`.
    pub fn get_many<T: DeserializeOwned>(&self, keys: &[&str]) -> Vec<Option<T>> {
        self.store
            .mget(keys)
            .into_iter()
            .zip(keys)
            .map(|(bytes, key)| {
                let bytes = bytes?;
                match serde_json::from_slice(&bytes) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        tracing::warn!(key, error = %e, "undecodable cache entry, dropping");
                        self.store.remove(key);
                        None
                    }
                }
            })
            .collect()
    }

    /// Batch set with a shared TTL.
    pub fn set_many<T: Serialize>(&self, entries: &[(&str, T)], ttl: Duration) -> Result<()> {
        let mut encoded = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            encoded.push((*key, serde_json::to_vec(value)?));
        }
        let borrowed: Vec<(&str, &[u8])> =
            encoded.iter().map(|(k, v)| (*k, v.as_slice())).collect();
        self.store.mset(&borrowed, ttl);
        Ok(())
    }

    pub fn remove(&self, key: &str) -> bool {
        self.store.remove(key)
    }

    pub fn sweep_expired(&self) -> usize {
        self.store.sweep_expired()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        self.store.stats()
    }
}
