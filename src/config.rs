//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::fmt;
use std::str::FromStr;

/// Which key-value store the cache manager talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Remote Redis server at `host:port`
    Redis,
    /// In-process store, no server required
    Memory,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Backend::Redis),
            "memory" => Ok(Backend::Memory),
            other => Err(format!("unknown cache backend '{}'", other)),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Redis => write!(f, "redis"),
            Backend::Memory => write!(f, "memory"),
        }
    }
}

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Store host name
    pub host: String,
    /// Store port
    pub port: u16,
    /// Store database index
    pub db: i64,
    /// Prefix prepended to every logical key
    pub key_prefix: String,
    /// Default TTL in seconds for writes without explicit TTL
    pub default_ttl: u64,
    /// Store backend selection
    pub backend: Backend,
    /// Memory backend sweep interval in seconds
    pub cleanup_interval: u64,
    /// Upper bound for the initial connection and liveness check, in seconds
    pub connect_timeout: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `REDIS_HOST` - Store host (default: localhost)
    /// - `REDIS_PORT` - Store port (default: 6379)
    /// - `REDIS_DB` - Database index (default: 0)
    /// - `CACHE_KEY_PREFIX` - Key prefix (default: app_cache:)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `CACHE_BACKEND` - `redis` or `memory` (default: redis)
    /// - `CLEANUP_INTERVAL` - Memory sweep frequency in seconds (default: 1)
    /// - `CONNECT_TIMEOUT` - Connect timeout in seconds (default: 2)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("REDIS_HOST").unwrap_or(defaults.host),
            port: parse_var("REDIS_PORT").unwrap_or(defaults.port),
            db: parse_var("REDIS_DB").unwrap_or(defaults.db),
            key_prefix: env::var("CACHE_KEY_PREFIX").unwrap_or(defaults.key_prefix),
            default_ttl: parse_var("DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            backend: parse_var("CACHE_BACKEND").unwrap_or(defaults.backend),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            connect_timeout: parse_var("CONNECT_TIMEOUT").unwrap_or(defaults.connect_timeout),
        }
    }

    /// Connection URL understood by the redis client.
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            db: 0,
            key_prefix: "app_cache:".to_string(),
            default_ttl: 300,
            backend: Backend::Redis,
            cleanup_interval: 1,
            connect_timeout: 2,
        }
    }
}
