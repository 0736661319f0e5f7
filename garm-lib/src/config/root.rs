use serde::Deserialize;

use super::cache::CacheConfig;
use super::logging::LoggingConfig;
use super::rate_limit::RateLimitConfig;
use super::ssrf::SsrfConfig;

/// Main configuration structure for the admission core.
///
/// Every section has sensible defaults; an empty TOML file is a valid config.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// SSRF validation: extra blocked ranges/hostnames and exact-IP overrides
    #[serde(default)]
    pub ssrf: SsrfConfig,
    /// Tiered rate limiting: per-tier policies and the global bucket
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Result cache: size budgets, TTL, compression threshold
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}
