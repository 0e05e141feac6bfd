//! Stored Entry Module
//!
//! Defines the record kept by the in-memory store for each key.

use chrono::{DateTime, Duration, Utc};

// == Stored Entry ==
/// A single text value with its expiry deadline.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    /// The stored text
    pub value: String,
    /// When the entry was written
    pub created_at: DateTime<Utc>,
    /// When the entry stops being visible
    pub expires_at: DateTime<Utc>,
}

impl StoredEntry {
    // == Constructor ==
    /// Creates a new entry that expires `ttl_seconds` from now.
    pub fn new(value: String, ttl_seconds: u64) -> Self {
        let now = Utc::now();
        let ttl = i64::try_from(ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        let expires_at = now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            value,
            created_at: now,
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches its deadline.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, `0` once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        (self.expires_at - Utc::now()).num_milliseconds().max(0) as u64
    }

    /// Returns remaining TTL in whole seconds, rounded to nearest the way
    /// Redis `TTL` reports it.
    pub fn ttl_remaining(&self) -> u64 {
        (self.ttl_remaining_ms() + 500) / 1000
    }
}
