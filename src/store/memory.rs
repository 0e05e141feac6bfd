//! Memory Store Module
//!
//! In-process key-value store with TTL expiration, sharing its map between
//! clones so a background sweeper and the cache manager see the same data.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::store::{KeyValueStore, StoredEntry};

// == Memory Store ==
/// HashMap-backed store with lazy and periodic TTL expiration.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Key-value storage
    entries: Arc<RwLock<HashMap<String, StoredEntry>>>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates a new empty MemoryStore.
    pub fn new() -> Self {
        Self::default()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    // == Length ==
    /// Returns the current number of entries, expired ones included until swept.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired: drop it now rather than waiting for the sweeper
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(StoredEntry::is_expired) {
            entries.remove(key);
            debug!(key, "memory store: removed expired entry on read");
        }
        Ok(None)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> StoreResult<()> {
        if ttl_secs == 0 {
            return Err(StoreError::Command(
                "invalid expire time in 'setex' command".to_string(),
            ));
        }

        let entry = StoredEntry::new(value.to_string(), ttl_secs);
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn del(&self, key: &str) -> StoreResult<u64> {
        let removed = self.entries.write().await.remove(key);
        Ok(match removed {
            Some(entry) if !entry.is_expired() => 1,
            _ => 0,
        })
    }

    async fn ttl(&self, key: &str) -> StoreResult<Option<u64>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(StoredEntry::ttl_remaining))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
