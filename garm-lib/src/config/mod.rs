mod cache;
mod loader;
mod logging;
mod rate_limit;
mod root;
mod ssrf;

pub use cache::CacheConfig;
pub use loader::load_from_path;
pub use logging::LoggingConfig;
pub use rate_limit::RateLimitConfig;
pub use root::Config;
pub use ssrf::SsrfConfig;
