//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror. None of these errors
//! escape the manager's collapsed API (`get`/`set`/`delete`); they surface
//! only through the explicit variants (`lookup`/`try_set`) and in logs.

use thiserror::Error;

// == Store Error Enum ==
/// Failure reported by a key-value store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Could not reach the store or the liveness check failed
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The store rejected or failed a command
    #[error("Command failed: {0}")]
    Command(String),

    /// The store did not answer in time
    #[error("Timed out after {0}s")]
    Timeout(u64),
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() {
            StoreError::Connection(err.to_string())
        } else {
            StoreError::Command(err.to_string())
        }
    }
}

// == Cache Error Enum ==
/// Failure reason at the cache manager boundary.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The manager runs without a store (degraded to no-op)
    #[error("Cache store unavailable")]
    Unavailable,

    /// The underlying store operation failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The value could not be encoded as JSON
    #[error("Serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The stored text could not be decoded; the entry was removed
    #[error("Corrupted entry at {key}: {source}")]
    Corrupted {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The stored JSON is valid but does not fit the requested type
    #[error("Entry at {key} does not match the requested type: {source}")]
    Mismatch {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

// == Result Type Aliases ==
/// Convenience Result type for store backends.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Convenience Result type for the cache manager.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Timeout(2);
        assert_eq!(err.to_string(), "Timed out after 2s");
    }

    #[test]
    fn test_cache_error_from_store_error() {
        let err: CacheError = StoreError::Command("WRONGTYPE".to_string()).into();
        assert!(matches!(err, CacheError::Store(StoreError::Command(_))));
        assert!(err.to_string().contains("WRONGTYPE"));
    }

    #[test]
    fn test_corrupted_error_names_key() {
        let source = serde_json::from_str::<serde_json::Value>("{[").unwrap_err();
        let err = CacheError::Corrupted {
            key: "app_cache:k".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("Corrupted entry at app_cache:k"));
    }
}
