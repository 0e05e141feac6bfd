//! Redis Store Module
//!
//! `KeyValueStore` backed by a Redis server through the multiplexed
//! `ConnectionManager`, which reconnects on its own after drops.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::store::KeyValueStore;

// == Redis Store ==
/// Handle to a Redis database.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    // == Connect ==
    /// Opens a managed connection to `url` (`redis://host:port/db`).
    ///
    /// The initial connection attempt is bounded by `timeout_secs`.
    pub async fn connect(url: &str, timeout_secs: u64) -> StoreResult<Self> {
        let client = redis::Client::open(url)?;
        let conn = tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            client.get_connection_manager(),
        )
        .await
        .map_err(|_| StoreError::Timeout(timeout_secs))??;

        debug!(url, "redis store: connection manager ready");
        Ok(Self { conn })
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err(StoreError::Connection(format!("unexpected PING reply: {}", pong)))
        }
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> StoreResult<u64> {
        let mut conn = self.conn.clone();
        let removed: u64 = conn.del(key).await?;
        Ok(removed)
    }

    async fn ttl(&self, key: &str) -> StoreResult<Option<u64>> {
        let mut conn = self.conn.clone();
        // -2 = missing key, -1 = no expiry
        let ttl: i64 = conn.ttl(key).await?;
        Ok(u64::try_from(ttl).ok())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
