//! Background Tasks Module
//!
//! Contains background tasks that run alongside the cache.
//!
//! # Tasks
//! - TTL Cleanup: Sweeps expired entries out of the in-memory store

mod cleanup;

pub use cleanup::spawn_cleanup_task;
