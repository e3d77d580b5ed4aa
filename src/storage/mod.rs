//! Storage backend trait and implementations.
//!
//! This module defines the `Storage` trait that attempt counters are kept in,
//! along with built-in implementations for in-memory and Redis storage.

mod entry;
#[cfg(feature = "memory")]
mod memory_gc;
#[cfg(feature = "redis")]
mod redis_cluster;

pub use entry::StorageEntry;

#[cfg(feature = "memory")]
pub use memory_gc::{GcConfig, GcInterval, MemoryStorage};

// RedisStorage with connection pooling
#[cfg(feature = "redis")]
pub use redis_cluster::{RedisConfig, RedisStorage};

use std::future::Future;
use std::time::Duration;

use crate::error::Result;

/// Storage backend trait for attempt counters.
///
/// All storage operations are async to support both local and distributed backends.
/// Implementations must be thread-safe (`Send + Sync`).
///
/// # Required Operations
///
/// - `get`: Retrieve a live entry by key
/// - `increment`: Atomically add to a counter, opening a window if needed
/// - `delete`: Remove an entry
///
/// # Example
///
/// ```ignore
/// use skp_support::storage::{MemoryStorage, Storage};
///
/// let storage = MemoryStorage::new();
/// let entry = storage.increment("login::10.0.0.1", 1, Duration::from_secs(300)).await?;
/// assert_eq!(entry.count, 1);
/// ```
pub trait Storage: Send + Sync + 'static {
    /// Get an entry by key.
    ///
    /// Returns `None` if the key doesn't exist or its window has closed.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<StorageEntry>>> + Send;

    /// Atomically increment a counter.
    ///
    /// If the key doesn't exist or its window has closed, it is created with
    /// count `delta` and a window of `ttl`. A live window is never extended.
    ///
    /// Returns the entry AFTER incrementing.
    fn increment(
        &self,
        key: &str,
        delta: u64,
        ttl: Duration,
    ) -> impl Future<Output = Result<StorageEntry>> + Send;

    /// Delete an entry.
    ///
    /// Returns success even if the key didn't exist.
    fn delete(&self, key: &str) -> impl Future<Output = Result<()>> + Send;
}

impl<S: Storage + ?Sized> Storage for std::sync::Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<StorageEntry>> {
        (**self).get(key).await
    }

    async fn increment(&self, key: &str, delta: u64, ttl: Duration) -> Result<StorageEntry> {
        (**self).increment(key, delta, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key).await
    }
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    async fn get(&self, key: &str) -> Result<Option<StorageEntry>> {
        (**self).get(key).await
    }

    async fn increment(&self, key: &str, delta: u64, ttl: Duration) -> Result<StorageEntry> {
        (**self).increment(key, delta, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key).await
    }
}

/// Get the current timestamp in milliseconds since Unix epoch.
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
