//! Cache Manager Module
//!
//! Facade over a `KeyValueStore` that namespaces keys, encodes values as
//! JSON and turns every store failure into a plain miss or `false`.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::cache::stats::{CacheStats, StatsRecorder};
use crate::config::Config;
use crate::error::{CacheError, Result, StoreError};
use crate::store::{KeyValueStore, RedisStore};

// == Cache Lookup ==
/// Outcome of reading one key through the manager.
#[derive(Debug)]
pub enum CacheLookup<T> {
    /// A stored value decoded successfully
    Hit(T),
    /// Nothing is stored under the key
    Miss,
    /// The store was unavailable, the read failed, or the entry was corrupted
    Failed(CacheError),
}

impl<T> CacheLookup<T> {
    /// Collapses the outcome to "value or absent".
    pub fn into_option(self) -> Option<T> {
        match self {
            CacheLookup::Hit(value) => Some(value),
            CacheLookup::Miss | CacheLookup::Failed(_) => None,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }
}

// == Cache Manager ==
/// JSON cache over a key-value store.
///
/// A manager built without a live store is a no-op cache: every get misses,
/// every set reports `false`, and deletes do nothing.
pub struct CacheManager {
    /// Store handle, `None` when running degraded
    store: Option<Arc<dyn KeyValueStore>>,
    /// Prefix prepended to every logical key
    key_prefix: String,
    /// TTL in seconds applied when a write gives none
    default_ttl: u64,
    /// Outcome counters
    stats: StatsRecorder,
}

impl CacheManager {
    // == Constructors ==
    /// Connects to the Redis server described by `config`.
    ///
    /// Never fails: if the connection or the liveness check does not succeed,
    /// the returned manager is a no-op cache.
    pub async fn connect(config: &Config) -> Self {
        match RedisStore::connect(&config.redis_url(), config.connect_timeout).await {
            Ok(store) => Self::from_store(store, config).await,
            Err(e) => {
                error!(
                    "CacheManager: could not connect to Redis at {}:{}: {}",
                    config.host, config.port, e
                );
                Self::disabled(config)
            }
        }
    }

    /// Wraps an already built store after checking that it answers `PING`.
    ///
    /// Degrades to a no-op cache if the check fails or times out.
    pub async fn from_store<S>(store: S, config: &Config) -> Self
    where
        S: KeyValueStore + 'static,
    {
        let timeout = Duration::from_secs(config.connect_timeout);
        let alive = match tokio::time::timeout(timeout, store.ping()).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(config.connect_timeout)),
        };

        match alive {
            Ok(()) => {
                info!(
                    backend = store.name(),
                    prefix = %config.key_prefix,
                    "CacheManager: connection established"
                );
                Self {
                    store: Some(Arc::new(store)),
                    key_prefix: config.key_prefix.clone(),
                    default_ttl: config.default_ttl,
                    stats: StatsRecorder::default(),
                }
            }
            Err(e) => {
                error!(
                    backend = store.name(),
                    "CacheManager: liveness check failed: {}", e
                );
                Self::disabled(config)
            }
        }
    }

    /// Creates a no-op cache.
    pub fn disabled(config: &Config) -> Self {
        warn!("CacheManager: running without a store, caching disabled");
        Self {
            store: None,
            key_prefix: config.key_prefix.clone(),
            default_ttl: config.default_ttl,
            stats: StatsRecorder::default(),
        }
    }

    // == Accessors ==
    /// Returns true if a live store backs this manager.
    pub fn is_available(&self) -> bool {
        self.store.is_some()
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    /// Returns the namespaced store key for a logical key.
    pub fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    /// Returns current counters.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    // == Lookup ==
    /// Reads and decodes `key`, reporting exactly what happened.
    ///
    /// Text that is not JSON at all is deleted before returning
    /// `Failed(CacheError::Corrupted)`. Valid JSON that does not fit `T` is
    /// left in place and reported as `Failed(CacheError::Mismatch)`. An empty
    /// stored string counts as a miss.
    pub async fn lookup<T: DeserializeOwned>(&self, key: &str) -> CacheLookup<T> {
        let Some(store) = &self.store else {
            debug!(key, "CacheManager: store not initialised, lookup skipped");
            self.stats.record_error();
            return CacheLookup::Failed(CacheError::Unavailable);
        };

        let full_key = self.full_key(key);
        let raw = match store.get(&full_key).await {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => {
                self.stats.record_miss();
                return CacheLookup::Miss;
            }
            Err(e) => {
                error!(key, "CacheManager: read error: {}, treating as miss", e);
                self.stats.record_error();
                return CacheLookup::Failed(e.into());
            }
        };

        let document: Value = match serde_json::from_str(&raw) {
            Ok(document) => document,
            Err(source) => {
                error!(
                    key,
                    "CacheManager: corrupted entry: {}, deleting and treating as miss", source
                );
                self.stats.record_corrupted();
                self.remove(store.as_ref(), key, &full_key).await;
                return CacheLookup::Failed(CacheError::Corrupted {
                    key: full_key,
                    source,
                });
            }
        };

        match serde_json::from_value(document) {
            Ok(value) => {
                self.stats.record_hit();
                CacheLookup::Hit(value)
            }
            Err(source) => {
                warn!(key, "CacheManager: entry does not match requested type: {}", source);
                self.stats.record_error();
                CacheLookup::Failed(CacheError::Mismatch {
                    key: full_key,
                    source,
                })
            }
        }
    }

    // == Get ==
    /// Returns the decoded value stored under `key`, or `None` on a miss or
    /// any failure.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.lookup(key).await.into_option()
    }

    // == Set ==
    /// Encodes `value` and stores it under `key` with expiry in one command.
    ///
    /// `ttl` is in seconds; `None` uses the configured default.
    pub async fn try_set<T>(&self, key: &str, value: &T, ttl: Option<u64>) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let result = self.write(key, value, ttl.unwrap_or(self.default_ttl)).await;
        match &result {
            Ok(()) => self.stats.record_write(),
            Err(e) => {
                error!(key, "CacheManager: write failed: {}", e);
                self.stats.record_error();
            }
        }
        result
    }

    /// Same as [`try_set`](Self::try_set), reporting only success.
    pub async fn set<T>(&self, key: &str, value: &T, ttl: Option<u64>) -> bool
    where
        T: Serialize + ?Sized,
    {
        self.try_set(key, value, ttl).await.is_ok()
    }

    async fn write<T>(&self, key: &str, value: &T, ttl: u64) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let store = self.store.as_ref().ok_or(CacheError::Unavailable)?;
        let encoded = serde_json::to_string(value).map_err(CacheError::Serialize)?;
        store.set_ex(&self.full_key(key), &encoded, ttl).await?;
        Ok(())
    }

    // == Delete ==
    /// Removes `key`. Failures are logged, never returned.
    pub async fn delete(&self, key: &str) {
        match &self.store {
            Some(store) => self.remove(store.as_ref(), key, &self.full_key(key)).await,
            None => debug!(key, "CacheManager: store not initialised, delete skipped"),
        }
    }

    async fn remove(&self, store: &dyn KeyValueStore, key: &str, full_key: &str) {
        match store.del(full_key).await {
            Ok(_) => info!(key, "CacheManager: cache key deleted"),
            Err(e) => {
                error!(key, "CacheManager: delete error: {}", e);
                self.stats.record_error();
            }
        }
    }

    // == TTL ==
    /// Seconds until `key` expires, or `None` if absent or unknown.
    pub async fn ttl_remaining(&self, key: &str) -> Option<u64> {
        let store = self.store.as_ref()?;
        match store.ttl(&self.full_key(key)).await {
            Ok(ttl) => ttl,
            Err(e) => {
                warn!(key, "CacheManager: ttl lookup failed: {}", e);
                None
            }
        }
    }
}

impl fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheManager")
            .field("backend", &self.store.as_ref().map(|s| s.name()))
            .field("key_prefix", &self.key_prefix)
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}
