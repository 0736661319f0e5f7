//! Tiered rate limiter with sharded per-key buckets and a global bucket.

use ahash::{AHashMap, RandomState};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::{hash, Tier, TierPolicies, TokenBucket, UsageLog};

/// Number of bucket shards; keys spread by `hash(key) % SHARDS`.
const SHARDS: usize = 16;

/// Result of a rate-limit check.
#[derive(Debug, Clone, PartialEq)]
pub enum RateDecision {
    /// Request may proceed; `remaining` is the per-key token balance.
    Allowed { remaining: f64 },
    /// Request exceeds the per-key or global budget.
    Limited { retry_after: Duration },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }

    /// Retry hint in whole seconds, present only when limited.
    pub fn retry_after_seconds(&self) -> Option<u64> {
        match self {
            RateDecision::Limited { retry_after } => Some(retry_after.as_secs()),
            RateDecision::Allowed { .. } => None,
        }
    }
}

/// Component seam: quota enforcement as seen by the admission pipeline.
pub trait RateLimiter: Send + Sync {
    /// Atomically check and consume `cost` tokens for `key`.
    fn check_and_consume(&self, key: &str, tier: Tier, cost: f64) -> RateDecision;
}

/// Capacity/refill for the global bucket shared across all identities.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
pub struct GlobalPolicy {
    pub capacity: f64,
    pub refill_per_second: f64,
}

/// Token-bucket limiter with per-tier policies.
///
/// Per-key buckets are created on first use with the tier's burst allowance
/// and garbage-collected after an inactivity window via [`Self::remove_idle`].
/// The global bucket, when configured, must also admit the request; on a
/// global denial the per-key tokens already taken are refunded so the caller
/// is not charged for a request that never ran.
pub struct TieredRateLimiter {
    policies: TierPolicies,
    shards: Vec<Mutex<AHashMap<String, TokenBucket>>>,
    global: Option<Mutex<TokenBucket>>,
    hasher: RandomState,
    usage: UsageLog,
}

impl TieredRateLimiter {
    pub fn new(policies: TierPolicies, global: Option<GlobalPolicy>) -> Self {
        let now = Instant::now();
        let shards = (0..SHARDS).map(|_| Mutex::new(AHashMap::new())).collect();
        let global = global.map(|g| {
            Mutex::new(TokenBucket::new(g.capacity, g.refill_per_second, g.capacity, now))
        });
        Self { policies, shards, global, hasher: RandomState::new(), usage: UsageLog::new() }
    }

    fn shard(&self, key: &str) -> &Mutex<AHashMap<String, TokenBucket>> {
        let idx = hash(key, &self.hasher) as usize % self.shards.len();
        &self.shards[idx]
    }

    fn consume_per_key(&self, key: &str, tier: Tier, cost: f64, now: Instant) -> RateDecision {
        let policy = match self.policies.for_tier(tier) {
            Some(policy) => policy,
            // Admin tier: unreachable via check_and_consume, defensive only.
            None => return RateDecision::Allowed { remaining: f64::MAX },
        };

        let mut buckets = match self.shard(key).lock() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::warn!("rate limiter shard lock poisoned, failing open");
                return RateDecision::Allowed { remaining: 0.0 };
            }
        };

        let bucket = buckets
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::from_policy(policy, now));

        match bucket.try_consume(cost, now) {
            Ok(remaining) => RateDecision::Allowed { remaining },
            Err(retry_after) => RateDecision::Limited { retry_after },
        }
    }

    fn refund_per_key(&self, key: &str, cost: f64) {
        if let Ok(mut buckets) = self.shard(key).lock() {
            if let Some(bucket) = buckets.get_mut(key) {
                bucket.credit(cost);
            }
        }
    }

    /// Remove buckets untouched for at least `max_idle`. Returns the number
    /// of buckets dropped. Called from the maintenance loop.
    pub fn remove_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        for shard in &self.shards {
            if let Ok(mut buckets) = shard.lock() {
                let before = buckets.len();
                buckets.retain(|_, bucket| bucket.idle_for(now) < max_idle);
                removed += before - buckets.len();
            }
        }
        if removed > 0 {
            tracing::debug!(removed, "garbage-collected idle rate-limit buckets");
        }
        removed
    }

    /// Usage analytics log.
    pub fn usage(&self) -> &UsageLog {
        &self.usage
    }

    /// Number of live per-key buckets across all shards.
    pub fn bucket_count(&self) -> usize {
        self.shards.iter().map(|s| s.lock().map(|g| g.len()).unwrap_or(0)).sum()
    }
}

impl RateLimiter for TieredRateLimiter {
    fn check_and_consume(&self, key: &str, tier: Tier, cost: f64) -> RateDecision {
        if tier == Tier::Admin {
            return RateDecision::Allowed { remaining: f64::MAX };
        }

        let now = Instant::now();
        let decision = self.consume_per_key(key, tier, cost, now);
        if !decision.is_allowed() {
            return decision;
        }

        // The request must also fit the aggregate budget.
        if let Some(global) = &self.global {
            let global_result = match global.lock() {
                Ok(mut bucket) => bucket.try_consume(cost, now),
                Err(_) => {
                    tracing::warn!("global rate bucket lock poisoned, failing open");
                    Ok(0.0)
                }
            };
            if let Err(retry_after) = global_result {
                self.refund_per_key(key, cost);
                return RateDecision::Limited { retry_after };
            }
        }

        self.usage.record(key, cost);
        decision
    }
}
