//! Tiered token-bucket rate limiting.
//!
//! Each identity key gets a lazily-created [`TokenBucket`] governed by the
//! policy of its [`Tier`]; a shared global bucket bounds aggregate throughput
//! on top of the per-key limits. Buckets live in shards selected by
//! `hash(key) % N` so concurrent checks never funnel through one lock.
//!
//! Consumption is recorded to an append-only [`UsageLog`] for analytics;
//! pruning of old records and garbage collection of idle buckets are driven
//! by the maintenance loop on fixed intervals, never from the request path.

mod bucket;
mod limiter;
mod usage;

pub(crate) use bucket::TokenBucket;
pub use limiter::{GlobalPolicy, RateDecision, RateLimiter, TieredRateLimiter};
pub use usage::{UsageLog, UsageRecord, UsageSummary};

use ahash::RandomState;
use serde::Deserialize;
use std::hash::Hash;

#[inline]
fn hash<T: Hash>(key: T, hasher: &RandomState) -> u64 {
    hasher.hash_one(key)
}

/// Rate-limit policy class for an identity.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Unauthenticated clients, keyed by IP.
    Guest,
    /// Authenticated users.
    User,
    /// Paying users with raised limits.
    Premium,
    /// Operators; bypasses rate limiting entirely.
    Admin,
}

/// Token-bucket parameters for one tier.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct TierPolicy {
    /// Maximum tokens the bucket can hold.
    pub capacity: f64,
    /// Tokens added per second.
    pub refill_per_second: f64,
    /// Initial token grant for a fresh bucket (must be <= capacity).
    pub burst_allowance: f64,
}

impl TierPolicy {
    pub const fn new(capacity: f64, refill_per_second: f64, burst_allowance: f64) -> Self {
        Self { capacity, refill_per_second, burst_allowance }
    }
}

/// Per-tier policies for the three limited tiers (admin is never limited).
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct TierPolicies {
    #[serde(default = "default_guest_policy")]
    pub guest: TierPolicy,
    #[serde(default = "default_user_policy")]
    pub user: TierPolicy,
    #[serde(default = "default_premium_policy")]
    pub premium: TierPolicy,
}

impl Default for TierPolicies {
    fn default() -> Self {
        Self {
            guest: default_guest_policy(),
            user: default_user_policy(),
            premium: default_premium_policy(),
        }
    }
}

impl TierPolicies {
    /// Policy for a limited tier; `None` for admin.
    pub fn for_tier(&self, tier: Tier) -> Option<TierPolicy> {
        match tier {
            Tier::Guest => Some(self.guest),
            Tier::User => Some(self.user),
            Tier::Premium => Some(self.premium),
            Tier::Admin => None,
        }
    }
}

fn default_guest_policy() -> TierPolicy {
    TierPolicy::new(100.0, 10.0, 100.0)
}

fn default_user_policy() -> TierPolicy {
    TierPolicy::new(300.0, 30.0, 300.0)
}

fn default_premium_policy() -> TierPolicy {
    TierPolicy::new(1000.0, 100.0, 1000.0)
}
