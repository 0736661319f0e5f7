use serde::Deserialize;

use crate::security::rate_limit::{GlobalPolicy, TierPolicies};

/// Rate limiting configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RateLimitConfig {
    /// Per-tier token bucket policies (guest/user/premium; admin bypasses)
    #[serde(default)]
    pub tiers: TierPolicies,
    /// Global bucket bounding aggregate throughput across all identities.
    /// Default: None (per-key limits only)
    #[serde(default)]
    pub global: Option<GlobalPolicy>,
    /// Usage record retention in days
    /// Default: 30
    #[serde(default = "default_usage_retention_days")]
    pub usage_retention_days: u64,
    /// Idle window after which a per-key bucket is garbage-collected, seconds
    /// Default: 600 (10 minutes)
    #[serde(default = "default_bucket_idle_seconds")]
    pub bucket_idle_seconds: u64,
    /// Interval between usage-prune/bucket-GC passes, seconds
    /// Default: 300 (5 minutes)
    #[serde(default = "default_maintenance_interval_seconds")]
    pub maintenance_interval_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            tiers: TierPolicies::default(),
            global: None,
            usage_retention_days: default_usage_retention_days(),
            bucket_idle_seconds: default_bucket_idle_seconds(),
            maintenance_interval_seconds: default_maintenance_interval_seconds(),
        }
    }
}

fn default_usage_retention_days() -> u64 {
    30
}

fn default_bucket_idle_seconds() -> u64 {
    600
}

fn default_maintenance_interval_seconds() -> u64 {
    300
}
