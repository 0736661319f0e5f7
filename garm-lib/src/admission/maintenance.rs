//! Background maintenance: cache TTL sweep, usage pruning, bucket GC.
//!
//! One tokio task drives both schedules. Each pass takes its locks once per
//! batch and never holds them across an await point; a tick that finds
//! nothing to do costs two map scans.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::cache::ResultCache;
use crate::config::Config;
use crate::security::rate_limit::TieredRateLimiter;
use crate::telemetry::Metrics;

/// Intervals and windows for the maintenance loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaintenanceConfig {
    /// Interval between cache TTL sweeps.
    pub cache_sweep_interval: Duration,
    /// Interval between usage-prune / bucket-GC passes.
    pub limiter_interval: Duration,
    /// Usage records older than this are pruned.
    pub usage_retention: Duration,
    /// Buckets idle longer than this are dropped.
    pub bucket_max_idle: Duration,
}

impl MaintenanceConfig {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            cache_sweep_interval: Duration::from_secs(cfg.cache.sweep_interval_seconds),
            limiter_interval: Duration::from_secs(cfg.rate_limit.maintenance_interval_seconds),
            usage_retention: Duration::from_secs(cfg.rate_limit.usage_retention_days * 24 * 3600),
            bucket_max_idle: Duration::from_secs(cfg.rate_limit.bucket_idle_seconds),
        }
    }
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            cache_sweep_interval: Duration::from_secs(300),
            limiter_interval: Duration::from_secs(300),
            usage_retention: Duration::from_secs(30 * 24 * 3600),
            bucket_max_idle: Duration::from_secs(600),
        }
    }
}

/// Spawn the maintenance loop. Cancel `shutdown` to stop it.
///
/// Each limiter pass also publishes `CacheStats` and usage snapshots to the
/// log and, when metrics are wired, to the exporter — this is the periodic
/// feed for the observability sink.
pub fn spawn_maintenance(
    cache: ResultCache,
    limiter: Arc<TieredRateLimiter>,
    cfg: MaintenanceConfig,
    metrics: Option<Arc<Metrics>>,
    shutdown: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut cache_tick = tokio::time::interval(cfg.cache_sweep_interval);
        let mut limiter_tick = tokio::time::interval(cfg.limiter_interval);
        // The first tick of a tokio interval fires immediately; skip it so a
        // fresh pipeline does not sweep before it has served anything.
        cache_tick.tick().await;
        limiter_tick.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::debug!("maintenance loop shutting down");
                    return;
                }
                _ = cache_tick.tick() => {
                    let swept = cache.sweep_expired();
                    if swept > 0 {
                        tracing::info!(swept, "cache TTL sweep complete");
                    }
                }
                _ = limiter_tick.tick() => {
                    let pruned = limiter.usage().prune(cfg.usage_retention);
                    let dropped = limiter.remove_idle(cfg.bucket_max_idle);
                    let stats = cache.stats();
                    let usage = limiter.usage().summary();
                    tracing::info!(
                        pruned,
                        dropped,
                        cache_hits = stats.hits,
                        cache_misses = stats.misses,
                        cache_evictions = stats.evictions,
                        bytes_saved = stats.bytes_saved_by_compression,
                        usage_requests = usage.total_requests,
                        usage_unique_keys = usage.unique_keys,
                        "limiter maintenance pass complete"
                    );
                    if let Some(metrics) = &metrics {
                        metrics.record_cache_stats(&stats);
                        metrics.record_usage_summary(&usage);
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheStore, MemoryCache};
    use crate::security::rate_limit::{RateLimiter, Tier, TierPolicies};

    #[tokio::test]
    async fn test_maintenance_sweeps_and_prunes() {
        let store = Arc::new(MemoryCache::new(100, 1024 * 1024, 1024));
        store.set("stale", b"v", Duration::from_millis(10));
        let cache = ResultCache::new(store);

        let limiter = Arc::new(TieredRateLimiter::new(TierPolicies::default(), None));
        limiter.check_and_consume("k", Tier::Guest, 1.0);

        let cfg = MaintenanceConfig {
            cache_sweep_interval: Duration::from_millis(30),
            limiter_interval: Duration::from_millis(30),
            usage_retention: Duration::ZERO,
            bucket_max_idle: Duration::ZERO,
        };
        let shutdown = CancellationToken::new();
        let handle =
            spawn_maintenance(cache.clone(), Arc::clone(&limiter), cfg, None, shutdown.clone());

        tokio::time::sleep(Duration::from_millis(120)).await;
        shutdown.cancel();
        handle.await.expect("maintenance task should exit cleanly");

        assert_eq!(cache.len(), 0, "expired entry should have been swept");
        assert!(limiter.usage().is_empty(), "usage records should have been pruned");
        assert_eq!(limiter.bucket_count(), 0, "idle buckets should have been dropped");
    }
}
