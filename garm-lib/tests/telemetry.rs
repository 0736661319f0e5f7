use garm_lib::telemetry::{init_metrics, init_tracing};
use serial_test::serial;

// Both init functions install process-global state (the tracing subscriber
// and the OTel meter provider), so these tests must not interleave.

#[test]
#[serial]
fn test_init_metrics_registers_instruments() {
    let (metrics, registry) = init_metrics().expect("metrics init");

    metrics.record_admission_allowed();
    metrics.record_admission_denied("RATE_LIMITED");
    metrics.record_admission_denied("BLOCKED_IP_RANGE");

    let families = registry.gather();
    assert!(!families.is_empty(), "registry should expose metric families");

    let text = prometheus::TextEncoder::new()
        .encode_to_string(&families)
        .expect("encode metrics");
    assert!(text.contains("garm_admission_allowed"), "missing admission counter:\n{text}");
    assert!(text.contains("garm_admission_denied"), "missing denial counter:\n{text}");
    assert!(text.contains("RATE_LIMITED"), "missing reason label:\n{text}");
}

#[test]
#[serial]
fn test_init_tracing_is_single_shot() {
    // First install wins; a second install must fail rather than silently
    // replace the subscriber.
    let first = init_tracing("info".to_string(), false);
    assert!(first.is_ok());

    let second = init_tracing("debug".to_string(), true);
    assert!(second.is_err());
}
