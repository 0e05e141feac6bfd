//! Store Module
//!
//! The key-value store boundary the cache manager is written against,
//! plus the Redis and in-memory backends.

mod entry;
mod memory;
mod redis_store;

use async_trait::async_trait;

use crate::error::StoreResult;

// Re-export public types
pub use entry::StoredEntry;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

// == Key-Value Store ==
/// Text key-value store with per-key expiry.
///
/// Keys passed here are already namespaced; stores never see logical keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Liveness check.
    async fn ping(&self) -> StoreResult<()>;

    /// Returns the text stored at `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Atomically stores `value` at `key` with a TTL in seconds.
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> StoreResult<()>;

    /// Removes `key`, returning how many keys were removed.
    async fn del(&self, key: &str) -> StoreResult<u64>;

    /// Remaining TTL in seconds, or `None` if the key is absent or persistent.
    async fn ttl(&self, key: &str) -> StoreResult<Option<u64>>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}
