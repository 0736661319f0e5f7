#![forbid(unsafe_code)]

pub mod admission;
pub mod cache;
pub mod config;
pub mod error;
pub mod security;
pub mod telemetry;

pub use admission::{
    spawn_maintenance, AdmissionDecision, AdmissionPipeline, AdmissionRequest, DenialReason,
    MaintenanceConfig, PipelineBuilder,
};
pub use cache::{cache_key, CacheStats, CacheStatsSnapshot, CacheStore, MemoryCache, ResultCache};
pub use config::{load_from_path, Config};
pub use error::{GarmError, Result};
pub use security::rate_limit::{
    GlobalPolicy, RateDecision, RateLimiter, Tier, TierPolicies, TierPolicy, TieredRateLimiter,
};
pub use security::ssrf::{BlockReason, SsrfValidator, Validation};
