//! Attempt counter contract and its storage-backed implementation.
//!
//! A `CounterStore` answers the questions an attempt limiter asks about a
//! real key: how many attempts were recorded, whether that reached the
//! maximum, how long until the window closes. `StorageCounter` implements the
//! contract over any [`Storage`] backend as a fixed window that opens on the
//! first hit and closes `decay` later.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::storage::{current_timestamp_ms, Storage};

/// Attempt counter contract.
///
/// All implementations must be thread-safe. Atomicity of `hit` across
/// concurrent callers is the implementation's responsibility.
pub trait CounterStore: Send + Sync + 'static {
    /// Attempts recorded for `key` in the live window (0 when none).
    fn attempts(&self, key: &str) -> impl Future<Output = Result<u64>> + Send;

    /// Check whether `key` has reached or exceeded `max_attempts`.
    fn too_many_attempts(&self, key: &str, max_attempts: u64) -> impl Future<Output = Result<bool>> + Send {
        async move {
            if self.attempts(key).await? < max_attempts {
                return Ok(false);
            }
            // A window closing between the two reads means the lock is over
            Ok(self.available_in(key).await? > 0)
        }
    }

    /// Record one attempt, opening a `decay` window if none is live.
    ///
    /// Returns the count after recording.
    fn hit(&self, key: &str, decay: Duration) -> impl Future<Output = Result<u64>> + Send;

    /// Clear the counter for `key`.
    fn reset_attempts(&self, key: &str) -> impl Future<Output = Result<()>> + Send;

    /// Attempts left before `max_attempts` is reached, never negative.
    fn retries_left(&self, key: &str, max_attempts: u64) -> impl Future<Output = Result<u64>> + Send {
        async move { Ok(max_attempts.saturating_sub(self.attempts(key).await?)) }
    }

    /// Seconds until the window for `key` closes (0 when none is live).
    fn available_in(&self, key: &str) -> impl Future<Output = Result<u64>> + Send;
}

impl<C: CounterStore + ?Sized> CounterStore for Arc<C> {
    async fn attempts(&self, key: &str) -> Result<u64> {
        (**self).attempts(key).await
    }

    async fn too_many_attempts(&self, key: &str, max_attempts: u64) -> Result<bool> {
        (**self).too_many_attempts(key, max_attempts).await
    }

    async fn hit(&self, key: &str, decay: Duration) -> Result<u64> {
        (**self).hit(key, decay).await
    }

    async fn reset_attempts(&self, key: &str) -> Result<()> {
        (**self).reset_attempts(key).await
    }

    async fn retries_left(&self, key: &str, max_attempts: u64) -> Result<u64> {
        (**self).retries_left(key, max_attempts).await
    }

    async fn available_in(&self, key: &str) -> Result<u64> {
        (**self).available_in(key).await
    }
}

/// Fixed-window attempt counter over a [`Storage`] backend.
///
/// # Example
///
/// ```ignore
/// use skp_support::{MemoryStorage, StorageCounter, CounterStore};
///
/// let counter = StorageCounter::new(MemoryStorage::new());
/// counter.hit("login::10.0.0.1", Duration::from_secs(300)).await?;
/// assert_eq!(counter.attempts("login::10.0.0.1").await?, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StorageCounter<S> {
    storage: S,
}

impl<S: Storage> StorageCounter<S> {
    /// Create a counter over the given storage.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Get the underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S: Storage> CounterStore for StorageCounter<S> {
    async fn attempts(&self, key: &str) -> Result<u64> {
        Ok(self.storage.get(key).await?.map_or(0, |entry| entry.count))
    }

    async fn too_many_attempts(&self, key: &str, max_attempts: u64) -> Result<bool> {
        // Storage only returns live windows, so one read answers both questions
        Ok(self
            .storage
            .get(key)
            .await?
            .is_some_and(|entry| entry.count >= max_attempts))
    }

    async fn hit(&self, key: &str, decay: Duration) -> Result<u64> {
        Ok(self.storage.increment(key, 1, decay).await?.count)
    }

    async fn reset_attempts(&self, key: &str) -> Result<()> {
        self.storage.delete(key).await
    }

    async fn available_in(&self, key: &str) -> Result<u64> {
        let now = current_timestamp_ms();
        Ok(self
            .storage
            .get(key)
            .await?
            .map_or(0, |entry| ceil_secs(entry.remaining(now))))
    }
}

/// Round a remaining duration up to whole seconds.
fn ceil_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs();
    if duration.subsec_nanos() > 0 { secs + 1 } else { secs }
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn counter() -> StorageCounter<MemoryStorage> {
        StorageCounter::new(MemoryStorage::new())
    }

    #[tokio::test]
    async fn test_hit_and_attempts() {
        let counter = counter();
        assert_eq!(counter.attempts("k").await.unwrap(), 0);

        assert_eq!(counter.hit("k", Duration::from_secs(60)).await.unwrap(), 1);
        assert_eq!(counter.hit("k", Duration::from_secs(60)).await.unwrap(), 2);
        assert_eq!(counter.attempts("k").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_too_many_attempts() {
        let counter = counter();
        assert!(!counter.too_many_attempts("k", 2).await.unwrap());

        counter.hit("k", Duration::from_secs(60)).await.unwrap();
        assert!(!counter.too_many_attempts("k", 2).await.unwrap());

        counter.hit("k", Duration::from_secs(60)).await.unwrap();
        assert!(counter.too_many_attempts("k", 2).await.unwrap());

        counter.reset_attempts("k").await.unwrap();
        assert!(!counter.too_many_attempts("k", 2).await.unwrap());
    }

    #[tokio::test]
    async fn test_retries_left_saturates() {
        let counter = counter();
        assert_eq!(counter.retries_left("k", 3).await.unwrap(), 3);

        for _ in 0..5 {
            counter.hit("k", Duration::from_secs(60)).await.unwrap();
        }
        assert_eq!(counter.retries_left("k", 3).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_available_in() {
        let counter = counter();
        assert_eq!(counter.available_in("k").await.unwrap(), 0);

        counter.hit("k", Duration::from_secs(300)).await.unwrap();
        let secs = counter.available_in("k").await.unwrap();
        assert!(secs > 295 && secs <= 300, "got {secs}");
    }

    #[tokio::test]
    async fn test_window_closes() {
        let counter = counter();
        counter.hit("k", Duration::from_millis(10)).await.unwrap();
        assert!(counter.too_many_attempts("k", 1).await.unwrap());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!counter.too_many_attempts("k", 1).await.unwrap());
        assert_eq!(counter.available_in("k").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_arc_counter_shares_state() {
        let shared = Arc::new(counter());
        let other = Arc::clone(&shared);

        shared.hit("k", Duration::from_secs(60)).await.unwrap();
        assert_eq!(other.attempts("k").await.unwrap(), 1);
    }

    #[test]
    fn test_ceil_secs() {
        assert_eq!(ceil_secs(Duration::from_millis(1)), 1);
        assert_eq!(ceil_secs(Duration::from_secs(2)), 2);
        assert_eq!(ceil_secs(Duration::ZERO), 0);
    }
}
