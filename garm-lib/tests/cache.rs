use garm_lib::{cache_key, CacheStore, MemoryCache, ResultCache};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
struct ProcessedPage {
    url: String,
    markdown: String,
    word_count: u32,
}

fn page(url: &str, body: &str) -> ProcessedPage {
    ProcessedPage { url: url.into(), markdown: body.into(), word_count: 7 }
}

fn typed(max_entries: usize, max_bytes: usize, threshold: usize) -> ResultCache {
    ResultCache::new(Arc::new(MemoryCache::new(max_entries, max_bytes, threshold)))
}

#[test]
fn test_set_then_get_returns_equal_value() {
    let cache = typed(100, 1024 * 1024, 1024);
    let value = page("https://example.com", "# Title\n\nBody text");
    cache.set("k", &value, Duration::from_secs(60)).expect("set");
    assert_eq!(cache.get::<ProcessedPage>("k"), Some(value));
}

#[test]
fn test_ttl_expiry() {
    let cache = typed(100, 1024 * 1024, 1024);
    cache.set("k", &page("u", "b"), Duration::from_millis(30)).expect("set");
    assert!(cache.get::<ProcessedPage>("k").is_some());

    std::thread::sleep(Duration::from_millis(60));
    assert!(cache.get::<ProcessedPage>("k").is_none());
}

#[test]
fn test_compressed_round_trip_preserves_value() {
    // 2 KB payload with a 1 KB threshold is stored compressed.
    let cache = typed(100, 1024 * 1024, 1024);
    let value = page("https://example.com/long", &"lorem ipsum ".repeat(200));
    cache.set("k", &value, Duration::from_secs(60)).expect("set");

    assert_eq!(cache.get::<ProcessedPage>("k"), Some(value));
    assert!(cache.stats().bytes_saved_by_compression > 0);
}

#[test]
fn test_eviction_is_least_recently_accessed_first() {
    let store = Arc::new(MemoryCache::new(2, 1024 * 1024, 1024));
    store.set("old", b"1", Duration::from_secs(60));
    std::thread::sleep(Duration::from_millis(5));
    store.set("newer", b"2", Duration::from_secs(60));
    std::thread::sleep(Duration::from_millis(5));

    // Access "old" so "newer" becomes the LRU victim.
    assert!(store.get("old").is_some());
    std::thread::sleep(Duration::from_millis(5));
    store.set("newest", b"3", Duration::from_secs(60));

    assert!(store.get("newer").is_none());
    assert!(store.get("old").is_some());
    assert!(store.get("newest").is_some());
}

#[test]
fn test_repeated_get_is_idempotent() {
    let cache = typed(100, 1024 * 1024, 1024);
    let value = page("https://example.com", "stable content");
    cache.set("k", &value, Duration::from_secs(60)).expect("set");

    for _ in 0..10 {
        assert_eq!(cache.get::<ProcessedPage>("k"), Some(value.clone()));
    }
    let stats = cache.stats();
    assert_eq!(stats.hits, 10);
    assert_eq!(stats.misses, 0);
}

#[test]
fn test_batch_get_set() {
    let cache = typed(100, 1024 * 1024, 1024);
    let a = page("https://a.example.com", "a");
    let b = page("https://b.example.com", "b");
    cache
        .set_many(&[("ka", a.clone()), ("kb", b.clone())], Duration::from_secs(60))
        .expect("set_many");

    let results = cache.get_many::<ProcessedPage>(&["ka", "absent", "kb"]);
    assert_eq!(results, vec![Some(a), None, Some(b)]);

    let stats = cache.stats();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 1);
}

#[test]
fn test_remove_and_len() {
    let cache = typed(100, 1024 * 1024, 1024);
    cache.set("k", &page("u", "b"), Duration::from_secs(60)).expect("set");
    assert_eq!(cache.len(), 1);
    assert!(cache.remove("k"));
    assert!(!cache.remove("k"));
    assert!(cache.is_empty());
}

#[derive(Serialize)]
struct FetchOptions {
    include_images: bool,
    max_depth: u8,
}

#[test]
fn test_cache_key_collapses_equivalent_requests() {
    let opts = FetchOptions { include_images: false, max_depth: 2 };
    let same = FetchOptions { include_images: false, max_depth: 2 };
    let different = FetchOptions { include_images: true, max_depth: 2 };

    let base = cache_key("page", "https://example.com", &opts);
    assert_eq!(base, cache_key("page", "https://example.com", &same));
    assert_ne!(base, cache_key("page", "https://example.com", &different));
    assert_ne!(base, cache_key("page", "https://example.org", &opts));
    assert_ne!(base, cache_key("transcript", "https://example.com", &opts));
}
