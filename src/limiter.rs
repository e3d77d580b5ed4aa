//! Keyed attempt limiter.
//!
//! A `RateLimiter` throttles a repeated action (a login, an OTP check) per
//! actor. It counts attempts under the real key `"{key}::{identifier}"`, where
//! `key` names the action and `identifier` names the actor (usually the client
//! IP). The limiter holds no counts itself: every question is answered by the
//! [`CounterStore`] it was built with, so limiters for the same real key built
//! on different requests see the same counter.
//!
//! # Example
//!
//! ```ignore
//! use skp_support::{key::IpKey, MemoryStorage, RateLimiter, StorageCounter};
//!
//! let store = Arc::new(StorageCounter::new(MemoryStorage::new()));
//!
//! // Per request
//! let mut limiter = RateLimiter::from_request(store.clone(), &request, &IpKey::new())?;
//! limiter.init("login", 3, 300);
//!
//! if limiter.must_lock().await? {
//!     return Err(too_many_attempts(limiter.available_in().await?));
//! }
//! if !credentials_ok {
//!     limiter.add_attempts().await?;
//! } else {
//!     limiter.reset().await?;
//! }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_DECAY_SECONDS, DEFAULT_MAX_ATTEMPTS, LimiterConfig};
use crate::counter::CounterStore;
use crate::error::{Result, SupportError};
use crate::headers::RateLimitHeaders;
use crate::key::{Key, real_key};

/// Attempt limiter for one actor.
#[derive(Debug, Clone)]
pub struct RateLimiter<C> {
    store: C,
    identifier: String,
    key: String,
    max_attempts: u64,
    decay_seconds: u64,
}

impl<C: CounterStore> RateLimiter<C> {
    /// Create a limiter for `identifier` with the default limits
    /// (3 attempts per 300 seconds) and an empty key.
    pub fn new(store: C, identifier: impl Into<String>) -> Self {
        Self {
            store,
            identifier: identifier.into(),
            key: String::new(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            decay_seconds: DEFAULT_DECAY_SECONDS,
        }
    }

    /// Create a limiter for the actor behind `request`.
    ///
    /// Fails with [`SupportError::KeyExtraction`] when `key` cannot derive an
    /// identifier from the request.
    pub fn from_request<R, K>(store: C, request: &R, key: &K) -> Result<Self>
    where
        K: Key<R>,
    {
        let identifier = key.extract(request).ok_or_else(|| {
            SupportError::KeyExtraction(format!("`{}` extractor found no identifier", key.name()))
        })?;
        Ok(Self::new(store, identifier))
    }

    /// Apply a configuration, as [`init`](Self::init) does.
    pub fn with_config(mut self, config: &LimiterConfig) -> Self {
        self.init(config.key(), config.max_attempts(), config.decay_seconds());
        self
    }

    /// Set key, maximum attempts and decay window at once.
    ///
    /// Stored counts are not touched.
    pub fn init(&mut self, key: impl Into<String>, max_attempts: u64, decay_seconds: u64) -> &mut Self {
        self.key = key.into();
        self.max_attempts = max_attempts;
        self.decay_seconds = decay_seconds;
        self
    }

    /// Set the logical key.
    pub fn set_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.key = key.into();
        self
    }

    /// Get the logical key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the actor identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Set the maximum attempts.
    pub fn set_max_attempts(&mut self, max_attempts: u64) -> &mut Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Get the maximum attempts.
    pub fn max_attempts(&self) -> u64 {
        self.max_attempts
    }

    /// Set the decay window in seconds.
    pub fn set_decay_seconds(&mut self, decay_seconds: u64) -> &mut Self {
        self.decay_seconds = decay_seconds;
        self
    }

    /// Get the decay window in seconds.
    pub fn decay_seconds(&self) -> u64 {
        self.decay_seconds
    }

    /// Get the counter store.
    pub fn store(&self) -> &C {
        &self.store
    }

    /// The key the counter is stored under: `"{key}::{identifier}"`.
    pub fn real_key(&self) -> String {
        real_key(&self.key, &self.identifier)
    }

    /// Check whether the actor has used up its attempts in the live window.
    pub async fn must_lock(&self) -> Result<bool> {
        self.store
            .too_many_attempts(&self.real_key(), self.max_attempts)
            .await
    }

    /// Record one attempt and return the count in the window.
    pub async fn add_attempts(&self) -> Result<u64> {
        self.store
            .hit(&self.real_key(), Duration::from_secs(self.decay_seconds))
            .await
    }

    /// Lock the actor out by recording `max_attempts` attempts.
    ///
    /// Store failures are logged and skipped so the remaining attempts are
    /// still recorded. Concurrent callers may push the count past the maximum.
    pub async fn lock(&self) {
        let key = self.real_key();
        let decay = Duration::from_secs(self.decay_seconds);
        let mut failed = 0u64;

        for _ in 0..self.max_attempts {
            if let Err(error) = self.store.hit(&key, decay).await {
                failed += 1;
                tracing::warn!(key = %key, error = %error, "attempt not recorded while locking");
            }
        }

        tracing::debug!(key = %key, attempts = self.max_attempts, failed, "limiter locked");
    }

    /// Clear the counter, unlocking the actor immediately.
    pub async fn reset(&self) -> Result<()> {
        let key = self.real_key();
        self.store.reset_attempts(&key).await?;
        tracing::debug!(key = %key, "limiter reset");
        Ok(())
    }

    /// Attempts left before the actor is locked.
    pub async fn retries_left(&self) -> Result<u64> {
        self.store
            .retries_left(&self.real_key(), self.max_attempts)
            .await
    }

    /// Seconds until the current window closes (0 when none is live).
    pub async fn available_in(&self) -> Result<u64> {
        self.store.available_in(&self.real_key()).await
    }

    /// Read the full limiter state for this actor.
    pub async fn status(&self) -> Result<LimitStatus> {
        let key = self.real_key();
        let attempts = self.store.attempts(&key).await?;
        let available_in = self.store.available_in(&key).await?;

        Ok(LimitStatus {
            locked: attempts >= self.max_attempts && available_in > 0,
            remaining: self.max_attempts.saturating_sub(attempts),
            limit: self.max_attempts,
            attempts,
            available_in,
            key,
        })
    }
}

/// Snapshot of a limiter's counter.
///
/// Useful for returning lockout information in API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitStatus {
    /// The real key the counter is stored under.
    pub key: String,
    /// Maximum attempts per window.
    pub limit: u64,
    /// Attempts recorded in the live window.
    pub attempts: u64,
    /// Attempts left before lockout.
    pub remaining: u64,
    /// Whether the actor is locked out.
    pub locked: bool,
    /// Seconds until the window closes.
    pub available_in: u64,
}

impl LimitStatus {
    /// Convert to HTTP headers.
    ///
    /// `Retry-After` is only set while the actor is locked out.
    pub fn to_headers(&self) -> Vec<(&'static str, String)> {
        RateLimitHeaders::from(self).to_vec()
    }
}
