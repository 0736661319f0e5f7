use opentelemetry::global;
use opentelemetry::metrics::{Counter, Gauge, Meter};
use opentelemetry::KeyValue;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::Registry;
use std::sync::Arc;

use crate::cache::CacheStatsSnapshot;
use crate::security::rate_limit::UsageSummary;

pub mod labels {
    pub const REASON: &str = "reason";
    pub const VERSION: &str = "version";
}

#[derive(Clone)]
pub struct Metrics {
    pub admission_allowed_total: Counter<u64>,
    pub admission_denied_total: Counter<u64>,

    // Cache counters mirrored from CacheStats on each maintenance pass
    pub cache_hits: Gauge<u64>,
    pub cache_misses: Gauge<u64>,
    pub cache_evictions: Gauge<u64>,
    pub cache_bytes_saved: Gauge<u64>,

    // Rate-limiter usage snapshot
    pub usage_requests: Gauge<u64>,
    pub usage_unique_keys: Gauge<u64>,

    // Build info
    pub build_info: Gauge<u64>,
}

impl Metrics {
    fn new(meter: Meter) -> Self {
        Self {
            admission_allowed_total: meter
                .u64_counter("garm_admission_allowed_total")
                .with_description("Requests admitted past SSRF and rate checks")
                .build(),
            admission_denied_total: meter
                .u64_counter("garm_admission_denied_total")
                .with_description("Requests denied admission, by reason")
                .build(),
            cache_hits: meter
                .u64_gauge("garm_cache_hits")
                .with_description("Cumulative cache hits")
                .build(),
            cache_misses: meter
                .u64_gauge("garm_cache_misses")
                .with_description("Cumulative cache misses")
                .build(),
            cache_evictions: meter
                .u64_gauge("garm_cache_evictions")
                .with_description("Cumulative LRU evictions")
                .build(),
            cache_bytes_saved: meter
                .u64_gauge("garm_cache_bytes_saved_by_compression")
                .with_description("Bytes saved by payload compression")
                .build(),
            usage_requests: meter
                .u64_gauge("garm_usage_requests")
                .with_description("Recorded rate-limited requests in the usage log")
                .build(),
            usage_unique_keys: meter
                .u64_gauge("garm_usage_unique_keys")
                .with_description("Distinct identity keys in the usage log")
                .build(),
            build_info: meter
                .u64_gauge("garm_build_info")
                .with_description("Build information")
                .build(),
        }
    }

    fn set_build_info(&self) {
        self.build_info.record(
            1,
            &[KeyValue::new(labels::VERSION, env!("CARGO_PKG_VERSION"))],
        );
    }

    pub fn record_admission_allowed(&self) {
        self.admission_allowed_total.add(1, &[]);
    }

    pub fn record_admission_denied(&self, reason: &str) {
        self.admission_denied_total
            .add(1, &[KeyValue::new(labels::REASON, reason.to_string())]);
    }

    pub fn record_cache_stats(&self, stats: &CacheStatsSnapshot) {
        self.cache_hits.record(stats.hits, &[]);
        self.cache_misses.record(stats.misses, &[]);
        self.cache_evictions.record(stats.evictions, &[]);
        self.cache_bytes_saved.record(stats.bytes_saved_by_compression, &[]);
    }

    pub fn record_usage_summary(&self, usage: &UsageSummary) {
        self.usage_requests.record(usage.total_requests, &[]);
        self.usage_unique_keys.record(usage.unique_keys, &[]);
    }
}

pub fn init_metrics() -> Result<(Arc<Metrics>, Registry), Box<dyn std::error::Error + Send + Sync>>
{
    let registry = Registry::default();

    let exporter = opentelemetry_prometheus::exporter()
        .with_registry(registry.clone())
        .build()?;

    let meter_provider = SdkMeterProvider::builder().with_reader(exporter).build();

    global::set_meter_provider(meter_provider);

    let meter = global::meter("garm");
    let metrics = Arc::new(Metrics::new(meter));

    metrics.set_build_info();

    Ok((metrics, registry))
}
