//! Cache Module
//!
//! JSON-valued cache facade over a `KeyValueStore`, with key prefixing,
//! default TTL, and a degrade-to-no-op policy when the store is unreachable.

mod manager;
mod stats;


// Re-export public types
pub use manager::{CacheLookup, CacheManager};
pub use stats::CacheStats;
