use serde::Deserialize;

/// Result cache configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CacheConfig {
    /// Maximum number of live entries
    /// Default: 10000
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    /// Total stored-byte budget (post-compression)
    /// Default: 67108864 (64 MiB)
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
    /// Payloads at or above this many bytes are gzip-compressed
    /// Default: 1024
    #[serde(default = "default_compression_threshold")]
    pub compression_threshold: usize,
    /// TTL applied when the caller does not supply one, seconds
    /// Default: 3600 (1 hour)
    #[serde(default = "default_ttl_seconds")]
    pub default_ttl_seconds: u64,
    /// Interval between background TTL sweeps, seconds
    /// Default: 300 (5 minutes)
    #[serde(default = "default_sweep_interval_seconds")]
    pub sweep_interval_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            max_bytes: default_max_bytes(),
            compression_threshold: default_compression_threshold(),
            default_ttl_seconds: default_ttl_seconds(),
            sweep_interval_seconds: default_sweep_interval_seconds(),
        }
    }
}

fn default_max_entries() -> usize {
    10_000
}

fn default_max_bytes() -> usize {
    64 * 1024 * 1024
}

fn default_compression_threshold() -> usize {
    1024
}

fn default_ttl_seconds() -> u64 {
    3600
}

fn default_sweep_interval_seconds() -> u64 {
    300
}
