//! Cache Aside - JSON caching in front of slow data sources
//!
//! A cache manager over Redis (or an in-process store) with key prefixing
//! and TTLs, and a cache-aside read path that falls back to the source of
//! truth whenever the cache misses or is unreachable.

pub mod aside;
pub mod cache;
pub mod config;
pub mod error;
pub mod store;
pub mod tasks;

pub use aside::{get_or_compute, get_product_with_cache};
pub use cache::{CacheLookup, CacheManager};
pub use config::{Backend, Config};
pub use tasks::spawn_cleanup_task;
