//! Integration Tests for the cache-aside read path
//!
//! Drives `get_product_with_cache` against real stores and a counting
//! product source.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use cache_aside::aside::{
    get_or_compute, get_product_with_cache, products_to_json, Origin, ProductRecord,
    ProductSource,
};
use cache_aside::error::{StoreError, StoreResult};
use cache_aside::store::{KeyValueStore, MemoryStore};
use cache_aside::{CacheLookup, CacheManager, Config};
use serde_json::{json, Value};

// == Test Doubles ==

/// Product source that counts calls and returns fixed data per user.
#[derive(Default)]
struct CountingSource {
    calls: AtomicUsize,
}

impl CountingSource {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductSource for CountingSource {
    async fn load(&self, user_id: u64) -> Vec<ProductRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        source_records(user_id)
    }
}

/// Memory store that can be taken down after the liveness check.
#[derive(Clone, Default)]
struct SwitchableStore {
    inner: MemoryStore,
    down: Arc<AtomicBool>,
}

impl SwitchableStore {
    fn take_down(&self) {
        self.down.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> StoreResult<()> {
        if self.down.load(Ordering::SeqCst) {
            Err(StoreError::Connection("Connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KeyValueStore for SwitchableStore {
    async fn ping(&self) -> StoreResult<()> {
        self.check()
    }
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.check()?;
        self.inner.get(key).await
    }
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> StoreResult<()> {
        self.check()?;
        self.inner.set_ex(key, value, ttl_secs).await
    }
    async fn del(&self, key: &str) -> StoreResult<u64> {
        self.check()?;
        self.inner.del(key).await
    }
    async fn ttl(&self, key: &str) -> StoreResult<Option<u64>> {
        self.check()?;
        self.inner.ttl(key).await
    }
    fn name(&self) -> &'static str {
        "switchable"
    }
}

// == Helper Functions ==

async fn create_test_cache() -> (CacheManager, MemoryStore) {
    let store = MemoryStore::new();
    let cache = CacheManager::from_store(store.clone(), &Config::default()).await;
    (cache, store)
}

// == Miss / Hit ==

#[tokio::test]
async fn test_cache_miss_calls_source_and_populates_cache() {
    let (cache, store) = create_test_cache().await;
    let source = CountingSource::default();

    let result = get_product_with_cache(&cache, &source, 1111).await;

    assert_eq!(source.calls(), 1);
    assert_eq!(result, source_output(1111));

    let stored = store.get("app_cache:account_value:1111").await.unwrap();
    assert!(stored.is_some(), "Result should be written under the prefixed key");
    assert_eq!(store.ttl("app_cache:account_value:1111").await.unwrap(), Some(120));
    assert_eq!(cache.get::<Value>("account_value:1111").await, Some(result));
}

#[tokio::test]
async fn test_cache_hit_does_not_call_source() {
    let (cache, store) = create_test_cache().await;
    let source = CountingSource::default();
    store
        .set_ex("app_cache:account_value:1111", r#"{"product":"CACHED"}"#, 120)
        .await
        .unwrap();

    let result = get_product_with_cache(&cache, &source, 1111).await;

    assert_eq!(source.calls(), 0);
    assert_eq!(result, json!({"product": "CACHED"}));
    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.corrupted, 0);
    assert_eq!(stats.writes, 0, "A hit must not write to the store");
    assert_eq!(
        store.get("app_cache:account_value:1111").await.unwrap().as_deref(),
        Some(r#"{"product":"CACHED"}"#)
    );
}

#[tokio::test]
async fn test_cache_hit_returns_cached_record_list() {
    let (cache, store) = create_test_cache().await;
    let source = CountingSource::default();
    store
        .set_ex(
            "app_cache:account_value:1111",
            r#"[{"product":"CACHED","total":999}]"#,
            120,
        )
        .await
        .unwrap();

    let result = get_product_with_cache(&cache, &source, 1111).await;

    assert_eq!(source.calls(), 0);
    assert_eq!(result, json!([{"product": "CACHED", "total": 999}]));
}

#[tokio::test]
async fn test_cache_aside_pattern_flow() {
    let (cache, _) = create_test_cache().await;
    let source = CountingSource::default();

    let first = get_product_with_cache(&cache, &source, 1111).await;
    assert_eq!(source.calls(), 1);

    let second = get_product_with_cache(&cache, &source, 1111).await;
    assert_eq!(source.calls(), 1);
    assert_eq!(first, second);

    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.writes, 1);
}

#[tokio::test]
async fn test_invalidation_forces_recompute() {
    let (cache, _) = create_test_cache().await;
    let source = CountingSource::default();

    get_product_with_cache(&cache, &source, 1111).await;
    cache.delete("account_value:1111").await;
    get_product_with_cache(&cache, &source, 1111).await;

    assert_eq!(source.calls(), 2);
}

// == Independent Keys ==

#[tokio::test]
async fn test_multiple_users_independent_cache() {
    let (cache, store) = create_test_cache().await;
    let source = CountingSource::default();

    let result1 = get_product_with_cache(&cache, &source, 1111).await;
    let result2 = get_product_with_cache(&cache, &source, 2222).await;

    assert_eq!(result1, source_output(1111));
    assert_eq!(result2, source_output(2222));
    assert_eq!(source.calls(), 2);
    assert_eq!(store.len().await, 2);

    cache.delete("account_value:1111").await;
    assert_eq!(
        cache.get::<Value>("account_value:2222").await,
        Some(result2),
        "Deleting one user must not touch another"
    );
}

// == Degraded Store ==

#[tokio::test]
async fn test_cache_write_failure_still_returns_data() {
    let store = SwitchableStore::default();
    let cache = CacheManager::from_store(store.clone(), &Config::default()).await;
    assert!(cache.is_available());
    store.take_down();

    let source = CountingSource::default();
    let fetched = get_or_compute(&cache, "account_value", 1111, 120, || source.load(1111)).await;

    assert_eq!(fetched.value, source_records(1111));
    assert_eq!(fetched.origin, Origin::Computed { cached: false });
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_store_down_at_startup_serves_source_every_time() {
    let store = SwitchableStore::default();
    store.take_down();
    let cache = CacheManager::from_store(store, &Config::default()).await;
    assert!(!cache.is_available());

    let source = CountingSource::default();
    for _ in 0..3 {
        let result = get_product_with_cache(&cache, &source, 1111).await;
        assert_eq!(result, source_output(1111));
    }
    assert_eq!(source.calls(), 3);
}

#[tokio::test]
async fn test_lookup_distinguishes_unreachable_from_miss() {
    let store = SwitchableStore::default();
    let cache = CacheManager::from_store(store.clone(), &Config::default()).await;

    assert!(matches!(
        cache.lookup::<Vec<ProductRecord>>("account_value:1").await,
        CacheLookup::Miss
    ));

    store.take_down();
    assert!(matches!(
        cache.lookup::<Vec<ProductRecord>>("account_value:1").await,
        CacheLookup::Failed(_)
    ));
}

// == Live Redis ==

/// Round trip against a real server: `cargo test -- --ignored` with Redis
/// on localhost:6379.
#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn test_redis_roundtrip() {
    let config = Config {
        key_prefix: "cache_aside_test:".to_string(),
        ..Config::from_env()
    };
    let cache = CacheManager::connect(&config).await;
    assert!(cache.is_available(), "Redis should be reachable");

    let source = CountingSource::default();
    cache.delete("account_value:4242").await;

    let first = get_product_with_cache(&cache, &source, 4242).await;
    let second = get_product_with_cache(&cache, &source, 4242).await;

    assert_eq!(first, second);
    assert_eq!(source.calls(), 1);
    assert_eq!(cache.ttl_remaining("account_value:4242").await.map(|t| t <= 120), Some(true));

    cache.delete("account_value:4242").await;
    assert_eq!(cache.get::<Value>("account_value:4242").await, None);
}

fn source_records(user_id: u64) -> Vec<ProductRecord> {
    vec![ProductRecord {
        total: Some(user_id as i64 * 100),
        ..ProductRecord::named(format!("USER{}", user_id))
    }]
}

fn source_output(user_id: u64) -> Value {
    products_to_json(source_records(user_id))
}
