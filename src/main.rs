//! Cache Aside demo
//!
//! Runs a cache miss, a cache hit and an explicit invalidation against the
//! configured store.

use std::time::Instant;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache_aside::aside::{cache_key, SimulatedDatabase, ACCOUNT_NAMESPACE};
use cache_aside::store::MemoryStore;
use cache_aside::{get_product_with_cache, spawn_cleanup_task, Backend, CacheManager, Config};

/// Demo entry point.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the cache manager (degrades to no-op if the store is down)
/// 4. Query the same user twice, then invalidate and query again
#[tokio::main]
async fn main() {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cache_aside=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: backend={}, store={}:{}/{}, prefix={}, default_ttl={}s",
        config.backend, config.host, config.port, config.db, config.key_prefix, config.default_ttl
    );

    let (cache, cleanup_handle) = match config.backend {
        Backend::Redis => (CacheManager::connect(&config).await, None),
        Backend::Memory => {
            let store = MemoryStore::new();
            let handle = spawn_cleanup_task(store.clone(), config.cleanup_interval);
            (CacheManager::from_store(store, &config).await, Some(handle))
        }
    };

    let database = SimulatedDatabase::default();
    let user_id = 1111;

    info!("--- First query: expecting cache MISS ---");
    get_product_with_cache(&cache, &database, user_id).await;

    info!("--- Second query: expecting cache HIT ---");
    let start = Instant::now();
    let products = get_product_with_cache(&cache, &database, user_id).await;
    let elapsed = start.elapsed();

    let first = &products[0];
    info!(
        "Final account value: product={} total={}",
        first["product"], first["total"]
    );
    info!("Second query retrieval time: {:.4} seconds", elapsed.as_secs_f64());

    info!("--- Active cache invalidation ---");
    cache.delete(&cache_key(ACCOUNT_NAMESPACE, user_id)).await;
    get_product_with_cache(&cache, &database, user_id).await;

    let stats = cache.stats();
    info!(
        "Cache stats: hits={} misses={} writes={} errors={} hit_rate={:.2}",
        stats.hits,
        stats.misses,
        stats.writes,
        stats.errors,
        stats.hit_rate()
    );

    if let Some(handle) = cleanup_handle {
        handle.abort();
    }
}
