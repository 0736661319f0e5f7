use serde::Deserialize;

/// Logging configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    /// Overridden by RUST_LOG when set.
    /// Default: "info"
    #[serde(default = "default_level")]
    pub level: String,
    /// Include the emitting module path in log lines
    /// Default: false
    #[serde(default)]
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_level(), show_target: false }
    }
}

fn default_level() -> String {
    "info".to_string()
}
