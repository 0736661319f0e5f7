use garm_lib::{load_from_path, Config, SsrfValidator, Tier};
use std::fs;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("garm.toml");
    fs::write(&path, contents).expect("write config file");
    path
}

#[test]
fn test_full_config_parses() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(
        &dir,
        r#"
[ssrf]
extra_blocked_ranges = ["198.18.0.0/15", "2001:db8::/32"]
extra_blocked_hostnames = ["build.corp"]
allowed_ips = ["10.1.2.3"]

[rate_limit]
usage_retention_days = 7
bucket_idle_seconds = 120
maintenance_interval_seconds = 60

[rate_limit.tiers.guest]
capacity = 50.0
refill_per_second = 5.0
burst_allowance = 25.0

[rate_limit.tiers.user]
capacity = 200.0
refill_per_second = 20.0
burst_allowance = 200.0

[rate_limit.tiers.premium]
capacity = 2000.0
refill_per_second = 200.0
burst_allowance = 2000.0

[rate_limit.global]
capacity = 5000.0
refill_per_second = 500.0

[cache]
max_entries = 500
max_bytes = 1048576
compression_threshold = 2048
default_ttl_seconds = 600
sweep_interval_seconds = 30

[logging]
level = "debug"
show_target = true
"#,
    );

    let cfg = load_from_path(&path).expect("config should load");

    assert_eq!(cfg.ssrf.extra_blocked_ranges.len(), 2);
    assert_eq!(cfg.ssrf.extra_blocked_hostnames, vec!["build.corp".to_string()]);
    assert_eq!(cfg.ssrf.allowed_ips, vec![IpAddr::from_str("10.1.2.3").expect("valid ip")]);

    assert_eq!(cfg.rate_limit.tiers.guest.capacity, 50.0);
    assert_eq!(cfg.rate_limit.tiers.guest.burst_allowance, 25.0);
    assert_eq!(cfg.rate_limit.tiers.premium.refill_per_second, 200.0);
    let global = cfg.rate_limit.global.expect("global policy set");
    assert_eq!(global.capacity, 5000.0);
    assert_eq!(cfg.rate_limit.usage_retention_days, 7);

    assert_eq!(cfg.cache.max_entries, 500);
    assert_eq!(cfg.cache.compression_threshold, 2048);
    assert_eq!(cfg.logging.level, "debug");
    assert!(cfg.logging.show_target);
}

#[test]
fn test_empty_config_yields_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(&dir, "");

    let cfg = load_from_path(&path).expect("empty config should load");
    assert_eq!(cfg, Config::default());
    assert_eq!(cfg.rate_limit.tiers.guest.capacity, 100.0);
    assert_eq!(cfg.rate_limit.global, None);
    assert_eq!(cfg.cache.max_entries, 10_000);
    assert_eq!(cfg.logging.level, "info");
}

#[test]
fn test_missing_file_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load_from_path(dir.path().join("absent.toml")).expect_err("should fail");
    assert!(err.to_string().contains("Failed to read config file"), "{err}");
}

#[test]
fn test_invalid_cidr_reports_offending_entry() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(
        &dir,
        r#"
[ssrf]
extra_blocked_ranges = ["10.0.0.0/8", "not-a-cidr"]
"#,
    );

    let err = load_from_path(&path).expect_err("should fail");
    assert!(err.to_string().contains("not-a-cidr"), "{err}");
}

#[test]
fn test_burst_exceeding_capacity_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(
        &dir,
        r#"
[rate_limit.tiers.guest]
capacity = 10.0
refill_per_second = 1.0
burst_allowance = 20.0
"#,
    );

    let err = load_from_path(&path).expect_err("should fail");
    let msg = err.to_string();
    assert!(msg.contains("guest") && msg.contains("burst allowance"), "{msg}");
}

#[test]
fn test_zero_cache_budget_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(
        &dir,
        r#"
[cache]
max_bytes = 0
"#,
    );

    let err = load_from_path(&path).expect_err("should fail");
    assert!(err.to_string().contains("max_bytes"), "{err}");
}

#[test]
fn test_negative_refill_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(
        &dir,
        r#"
[rate_limit.tiers.user]
capacity = 10.0
refill_per_second = -1.0
burst_allowance = 10.0
"#,
    );

    let err = load_from_path(&path).expect_err("should fail");
    let msg = err.to_string();
    assert!(msg.contains("user") && msg.contains("refill"), "{msg}");
}

#[test]
fn test_loaded_ssrf_section_drives_validator() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(
        &dir,
        r#"
[ssrf]
extra_blocked_ranges = ["198.18.0.0/15"]
extra_blocked_hostnames = ["ci.corp"]
allowed_ips = ["10.1.2.3"]
"#,
    );

    let cfg = load_from_path(&path).expect("config should load");
    let validator = SsrfValidator::from_config(&cfg.ssrf);

    assert!(!validator.validate_ip(IpAddr::from_str("198.18.0.1").expect("ip")).safe);
    assert!(!validator.validate_url("https://ci.corp/job/1").safe);
    assert!(validator.validate_ip(IpAddr::from_str("10.1.2.3").expect("ip")).safe);
    assert!(!validator.validate_ip(IpAddr::from_str("10.1.2.4").expect("ip")).safe);
}

#[test]
fn test_tier_names_parse_lowercase() {
    #[derive(serde::Deserialize)]
    struct Doc {
        tier: Tier,
    }

    let doc: Doc = toml::from_str("tier = \"admin\"").expect("parse");
    assert_eq!(doc.tier, Tier::Admin);
    let doc: Doc = toml::from_str("tier = \"premium\"").expect("parse");
    assert_eq!(doc.tier, Tier::Premium);
    assert!(toml::from_str::<Doc>("tier = \"Root\"").is_err());
}
