//! Redis storage backend for distributed attempt counting.
//!
//! Uses connection pooling for high performance. Counters are plain Redis
//! integers whose window is the key's own expiry.

use std::time::Duration;

use deadpool_redis::{
    Config, Connection, Pool, Runtime,
    redis::{AsyncCommands, Script, cmd, pipe},
};

use crate::error::{ConnectionError, Result, StorageError};
use crate::storage::{current_timestamp_ms, Storage, StorageEntry};

/// Increment and open the window on first hit, in one round trip.
const INCREMENT_SCRIPT: &str = r"
local count = redis.call('INCRBY', KEYS[1], ARGV[1])
local ttl = redis.call('PTTL', KEYS[1])
if ttl < 0 then
    redis.call('PEXPIRE', KEYS[1], ARGV[2])
    ttl = tonumber(ARGV[2])
end
return {count, ttl}
";

/// Redis storage configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
    /// Connection pool size
    pub pool_size: usize,
    /// Key prefix for attempt counters
    pub key_prefix: String,
    /// Connection timeout
    pub connection_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            pool_size: 10,
            key_prefix: "attempts:".to_string(),
            connection_timeout: Duration::from_secs(5),
        }
    }
}

impl RedisConfig {
    /// Create a new Redis configuration.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the key prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Set the pool size.
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    /// Set the connection timeout.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }
}

/// Redis storage backend for distributed attempt counting.
///
/// # Example
///
/// ```ignore
/// use skp_support::storage::{RedisStorage, RedisConfig};
///
/// let config = RedisConfig::new("redis://localhost:6379")
///     .with_prefix("myapp:attempts:")
///     .with_pool_size(20);
///
/// let storage = RedisStorage::new(config).await?;
/// ```
pub struct RedisStorage {
    pool: Pool,
    key_prefix: String,
    increment: Script,
}

impl std::fmt::Debug for RedisStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStorage")
            .field("key_prefix", &self.key_prefix)
            .finish()
    }
}

impl RedisStorage {
    /// Create a new Redis storage from configuration.
    pub async fn new(config: RedisConfig) -> Result<Self> {
        let mut cfg = Config::from_url(&config.url);
        cfg.pool = Some(deadpool_redis::PoolConfig::new(config.pool_size));
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| ConnectionError::ConnectionFailed(e.to_string()))?;

        // Test connection
        let mut conn = tokio::time::timeout(config.connection_timeout, pool.get())
            .await
            .map_err(|_| ConnectionError::Timeout(config.connection_timeout))?
            .map_err(|e| ConnectionError::ConnectionFailed(e.to_string()))?;
        let _: () = cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(|e| ConnectionError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            pool,
            key_prefix: config.key_prefix,
            increment: Script::new(INCREMENT_SCRIPT),
        })
    }

    /// Create a new Redis storage from a URL.
    pub async fn from_url(url: impl Into<String>) -> Result<Self> {
        Self::new(RedisConfig::new(url)).await
    }

    /// Get the full key with prefix.
    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> Result<Connection> {
        self.pool
            .get()
            .await
            .map_err(|_| StorageError::PoolExhausted.into())
    }
}

/// Build an entry from a counter value and its PTTL reply.
fn entry_from_reply(count: u64, pttl_ms: i64, now: u64) -> Option<StorageEntry> {
    // -2: key missing, -1: no expiry (foreign key, treat as closed)
    if pttl_ms <= 0 {
        return None;
    }
    Some(StorageEntry::new(count, now.saturating_add(pttl_ms as u64)))
}

impl Storage for RedisStorage {
    async fn get(&self, key: &str) -> Result<Option<StorageEntry>> {
        let mut conn = self.get_conn().await?;
        let full_key = self.full_key(key);

        let (count, pttl): (Option<u64>, i64) = pipe()
            .cmd("GET")
            .arg(&full_key)
            .cmd("PTTL")
            .arg(&full_key)
            .query_async(&mut *conn)
            .await
            .map_err(|e| StorageError::operation_failed(e.to_string(), true))?;

        Ok(count.and_then(|count| entry_from_reply(count, pttl, current_timestamp_ms())))
    }

    async fn increment(&self, key: &str, delta: u64, ttl: Duration) -> Result<StorageEntry> {
        let mut conn = self.get_conn().await?;
        let full_key = self.full_key(key);
        let ttl_ms = (ttl.as_millis() as u64).max(1);

        let (count, pttl): (u64, i64) = self
            .increment
            .key(&full_key)
            .arg(delta)
            .arg(ttl_ms)
            .invoke_async(&mut *conn)
            .await
            .map_err(|e| StorageError::operation_failed(e.to_string(), true))?;

        entry_from_reply(count, pttl, current_timestamp_ms()).ok_or_else(|| {
            StorageError::Serialization(format!("counter {full_key} has no expiry after increment"))
                .into()
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.get_conn().await?;
        let full_key = self.full_key(key);

        conn.del::<_, ()>(&full_key)
            .await
            .map_err(|e| StorageError::operation_failed(e.to_string(), true))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redis_config() {
        let config = RedisConfig::new("redis://localhost:6380")
            .with_prefix("test:")
            .with_pool_size(5);

        assert_eq!(config.url, "redis://localhost:6380");
        assert_eq!(config.key_prefix, "test:");
        assert_eq!(config.pool_size, 5);
    }

    #[test]
    fn test_entry_from_reply() {
        assert_eq!(entry_from_reply(3, 1_500, 10_000), Some(StorageEntry::new(3, 11_500)));
        assert_eq!(entry_from_reply(3, -1, 10_000), None);
        assert_eq!(entry_from_reply(3, -2, 10_000), None);
    }
}
