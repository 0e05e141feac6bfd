//! Cache-Aside Module
//!
//! Read path that consults the cache first and falls back to the source of
//! truth on a miss, writing the fresh result back on a best-effort basis.
//!
//! Per call: `LOOKUP -> HIT -> return` or
//! `LOOKUP -> MISS -> COMPUTE -> POPULATE (best effort) -> return`.
//! There are no retries; any cache failure is treated as a miss.

mod products;

use std::fmt::Display;
use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{CacheLookup, CacheManager};

pub use products::{
    get_product_with_cache, products_to_json, ProductRecord, ProductSource, SimulatedDatabase,
    ACCOUNT_NAMESPACE, PRODUCT_CACHE_TTL,
};

// == Origin ==
/// Where a value returned by [`get_or_compute`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Served from the cache
    Cache,
    /// Computed from the source; `cached` tells whether the write-back succeeded
    Computed { cached: bool },
}

/// A value together with its [`Origin`].
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub value: T,
    pub origin: Origin,
}

impl<T> Fetched<T> {
    pub fn into_value(self) -> T {
        self.value
    }
}

// == Cache Key ==
/// Builds the logical cache key `"<namespace>:<id>"`.
pub fn cache_key(namespace: &str, id: impl Display) -> String {
    format!("{}:{}", namespace, id)
}

// == Get Or Compute ==
/// Returns the cached value for `namespace:id`, or runs `compute` once and
/// caches its result for `ttl` seconds.
///
/// The computed value is returned whether or not the write-back succeeds.
pub async fn get_or_compute<T, F, Fut>(
    cache: &CacheManager,
    namespace: &str,
    id: impl Display,
    ttl: u64,
    compute: F,
) -> Fetched<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    let key = cache_key(namespace, id);

    match cache.lookup::<T>(&key).await {
        CacheLookup::Hit(value) => {
            info!(key = %key, "cache hit");
            return Fetched {
                value,
                origin: Origin::Cache,
            };
        }
        CacheLookup::Miss => info!(key = %key, "cache miss, loading from source"),
        CacheLookup::Failed(e) => {
            warn!(key = %key, "cache unusable ({}), loading from source", e)
        }
    }

    let value = compute().await;

    let cached = cache.set(&key, &value, Some(ttl)).await;
    if cached {
        debug!(key = %key, ttl, "result written to cache");
    } else {
        warn!(key = %key, "failed to write result to cache, serving source data");
    }

    Fetched {
        value,
        origin: Origin::Computed { cached },
    }
}
