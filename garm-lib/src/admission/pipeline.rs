use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{cache_key, CacheStore, MemoryCache, ResultCache};
use crate::config::Config;
use crate::error::Result;
use crate::security::rate_limit::{RateLimiter, Tier, TieredRateLimiter};
use crate::security::ssrf::SsrfValidator;
use crate::telemetry::Metrics;

/// Inbound request as seen by the admission layer.
///
/// `identity_key` is an already-derived identity (hashed API key or client
/// IP); authentication itself happens upstream.
#[derive(Debug, Clone, Copy)]
pub struct AdmissionRequest<'a> {
    pub url: &'a str,
    pub identity_key: &'a str,
    pub tier: Tier,
}

/// Why a request was denied admission.
#[derive(Debug, Clone, PartialEq)]
pub enum DenialReason {
    /// The target URL failed SSRF validation. `code` is the specific
    /// validator code; `detail` is safe to echo to the client.
    SsrfBlocked { code: &'static str, detail: String },
    /// The identity (or the service as a whole) is over budget.
    RateLimited,
}

impl DenialReason {
    /// Top-level machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            DenialReason::SsrfBlocked { .. } => "SSRF_BLOCKED",
            DenialReason::RateLimited => "RATE_LIMITED",
        }
    }
}

/// Outcome of an admission check.
///
/// Exactly one of these shapes occurs:
/// - denied: `allowed == false`, `reason` set, `retry_after_seconds` set for
///   rate limiting only;
/// - cache hit: `allowed == true`, `cached_result` set — skip the downstream
///   call entirely;
/// - cache miss: `allowed == true`, `cache_key` set — run the downstream
///   processor, then populate the cache via
///   [`AdmissionPipeline::store_result`].
#[derive(Debug, Clone, PartialEq)]
pub struct AdmissionDecision<T> {
    pub allowed: bool,
    pub reason: Option<DenialReason>,
    pub retry_after_seconds: Option<u64>,
    pub cached_result: Option<T>,
    pub cache_key: Option<String>,
}

impl<T> AdmissionDecision<T> {
    fn denied(reason: DenialReason, retry_after_seconds: Option<u64>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            retry_after_seconds,
            cached_result: None,
            cache_key: None,
        }
    }

    fn hit(value: T) -> Self {
        Self {
            allowed: true,
            reason: None,
            retry_after_seconds: None,
            cached_result: Some(value),
            cache_key: None,
        }
    }

    fn miss(cache_key: String) -> Self {
        Self {
            allowed: true,
            reason: None,
            retry_after_seconds: None,
            cached_result: None,
            cache_key: Some(cache_key),
        }
    }

    pub fn is_cache_hit(&self) -> bool {
        self.cached_result.is_some()
    }
}

/// Orchestrates SSRF validation, rate limiting, and the result cache.
///
/// Built explicitly via [`PipelineBuilder`] or [`AdmissionPipeline::from_config`];
/// there are no process-global instances, so tests and tenants can run
/// isolated pipelines side by side.
pub struct AdmissionPipeline {
    validator: Arc<SsrfValidator>,
    limiter: Arc<dyn RateLimiter>,
    cache: ResultCache,
    namespace: String,
    default_ttl: Duration,
    metrics: Option<Arc<Metrics>>,
}

impl AdmissionPipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Assemble a pipeline with its own validator, limiter, and memory cache
    /// from a validated [`Config`].
    pub fn from_config(cfg: &Config) -> Self {
        let limiter = Arc::new(TieredRateLimiter::new(
            cfg.rate_limit.tiers,
            cfg.rate_limit.global,
        ));
        let store = Arc::new(MemoryCache::new(
            cfg.cache.max_entries,
            cfg.cache.max_bytes,
            cfg.cache.compression_threshold,
        ));
        Self::builder()
            .validator(Arc::new(SsrfValidator::from_config(&cfg.ssrf)))
            .limiter(limiter)
            .cache_store(store)
            .default_ttl(Duration::from_secs(cfg.cache.default_ttl_seconds))
            .build()
    }

    /// Run the admission chain for one request.
    ///
    /// `params` are the caller's processing options; together with the URL
    /// they determine the cache key, so equivalent requests collapse to one
    /// entry.
    pub fn admit<T, P>(&self, req: &AdmissionRequest<'_>, params: &P) -> AdmissionDecision<T>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        // SSRF first: a blocked URL must not consume quota or touch the cache.
        let validation = self.validator.validate_url(req.url);
        if !validation.safe {
            let code = validation.reason.map(|r| r.code()).unwrap_or("SSRF_BLOCKED");
            let detail = validation.detail.unwrap_or_default();
            tracing::info!(url = req.url, code, "admission denied: unsafe URL");
            if let Some(metrics) = &self.metrics {
                metrics.record_admission_denied(code);
            }
            return AdmissionDecision::denied(DenialReason::SsrfBlocked { code, detail }, None);
        }

        let decision = self.limiter.check_and_consume(req.identity_key, req.tier, 1.0);
        if let Some(retry_after) = decision.retry_after_seconds() {
            tracing::debug!(identity = req.identity_key, retry_after, "admission denied: rate limited");
            if let Some(metrics) = &self.metrics {
                metrics.record_admission_denied("RATE_LIMITED");
            }
            return AdmissionDecision::denied(DenialReason::RateLimited, Some(retry_after));
        }

        // Cache last: only admitted traffic pays for the lookup.
        let key = cache_key(&self.namespace, req.url, params);
        if let Some(metrics) = &self.metrics {
            metrics.record_admission_allowed();
        }
        match self.cache.get::<T>(&key) {
            Some(value) => {
                tracing::debug!(cache_key = %key, "admission cache hit");
                AdmissionDecision::hit(value)
            }
            None => AdmissionDecision::miss(key),
        }
    }

    /// Populate the cache after the downstream processor completed.
    ///
    /// `ttl` falls back to the configured default when `None`.
    pub fn store_result<T: Serialize>(
        &self,
        cache_key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        self.cache.set(cache_key, value, ttl.unwrap_or(self.default_ttl))
    }

    pub fn validator(&self) -> &SsrfValidator {
        &self.validator
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }
}

/// Explicit-instance factory for [`AdmissionPipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    validator: Option<Arc<SsrfValidator>>,
    limiter: Option<Arc<dyn RateLimiter>>,
    store: Option<Arc<dyn CacheStore>>,
    namespace: Option<String>,
    default_ttl: Option<Duration>,
    metrics: Option<Arc<Metrics>>,
}

impl PipelineBuilder {
    pub fn validator(mut self, validator: Arc<SsrfValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn cache_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Cache key namespace; defaults to "admission".
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    pub fn metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> AdmissionPipeline {
        AdmissionPipeline {
            validator: self.validator.unwrap_or_else(|| Arc::new(SsrfValidator::new())),
            limiter: self
                .limiter
                .unwrap_or_else(|| Arc::new(TieredRateLimiter::new(Default::default(), None))),
            cache: ResultCache::new(self.store.unwrap_or_else(|| {
                Arc::new(MemoryCache::new(10_000, 64 * 1024 * 1024, 1024))
            })),
            namespace: self.namespace.unwrap_or_else(|| "admission".to_string()),
            default_ttl: self.default_ttl.unwrap_or(Duration::from_secs(3600)),
            metrics: self.metrics,
        }
    }
}
