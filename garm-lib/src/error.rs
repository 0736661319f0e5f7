use thiserror::Error;

/// Errors that can occur in the admission core.
///
/// SSRF blocks and rate-limit denials are *decisions*, not errors; they are
/// returned as typed values from the pipeline. This type covers the remaining
/// failure classes: configuration problems (fatal at startup) and the I/O or
/// serialization faults the cache layer contains internally.
#[derive(Error, Debug)]
pub enum GarmError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GarmError>;
