use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::{GarmError, Result};
use crate::security::rate_limit::TierPolicy;

pub fn load_from_path<P: AsRef<Path>>(p: P) -> Result<Config> {
    let txt = fs::read_to_string(p)
        .map_err(|e| GarmError::Config(format!("Failed to read config file: {e}")))?;
    let cfg: Config = toml::from_str(&txt)
        .map_err(|e| GarmError::Config(format!("Failed to parse config: {e}")))?;

    validate_config(&cfg)?;

    Ok(cfg)
}

/// Startup validation; any failure here is fatal (CONFIG_ERROR class).
pub fn validate_config(cfg: &Config) -> Result<()> {
    let tiers = &cfg.rate_limit.tiers;
    validate_tier("guest", &tiers.guest)?;
    validate_tier("user", &tiers.user)?;
    validate_tier("premium", &tiers.premium)?;

    if let Some(global) = &cfg.rate_limit.global {
        if global.capacity <= 0.0 || global.refill_per_second <= 0.0 {
            return Err(GarmError::Config(
                "global rate limit capacity and refill rate must be positive".to_string(),
            ));
        }
    }

    if cfg.rate_limit.usage_retention_days == 0 {
        return Err(GarmError::Config("usage_retention_days must be nonzero".to_string()));
    }
    if cfg.rate_limit.bucket_idle_seconds == 0 {
        return Err(GarmError::Config("bucket_idle_seconds must be nonzero".to_string()));
    }
    if cfg.rate_limit.maintenance_interval_seconds == 0 {
        return Err(GarmError::Config(
            "maintenance_interval_seconds must be nonzero".to_string(),
        ));
    }

    if cfg.cache.max_entries == 0 {
        return Err(GarmError::Config("cache max_entries must be nonzero".to_string()));
    }
    if cfg.cache.max_bytes == 0 {
        return Err(GarmError::Config("cache max_bytes must be nonzero".to_string()));
    }
    if cfg.cache.compression_threshold == 0 {
        return Err(GarmError::Config("cache compression_threshold must be nonzero".to_string()));
    }
    if cfg.cache.default_ttl_seconds == 0 {
        return Err(GarmError::Config("cache default_ttl_seconds must be nonzero".to_string()));
    }
    if cfg.cache.sweep_interval_seconds == 0 {
        return Err(GarmError::Config("cache sweep_interval_seconds must be nonzero".to_string()));
    }

    Ok(())
}

fn validate_tier(name: &str, policy: &TierPolicy) -> Result<()> {
    if policy.capacity <= 0.0 {
        return Err(GarmError::Config(format!("tier '{name}': capacity must be positive")));
    }
    if policy.refill_per_second <= 0.0 {
        return Err(GarmError::Config(format!("tier '{name}': refill rate must be positive")));
    }
    if policy.burst_allowance <= 0.0 {
        return Err(GarmError::Config(format!("tier '{name}': burst allowance must be positive")));
    }
    if policy.burst_allowance > policy.capacity {
        return Err(GarmError::Config(format!(
            "tier '{name}': burst allowance {} exceeds capacity {}",
            policy.burst_allowance, policy.capacity
        )));
    }
    Ok(())
}
