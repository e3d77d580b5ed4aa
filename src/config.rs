//! Configuration for limiters and paginators.
//!
//! A `LimiterConfig` defines how many attempts an actor gets within a decay
//! window for one logical key; a `PaginationConfig` defines the whitelists and
//! defaults a paginator validates inbound parameters against. Both can be
//! deserialized from application configuration.
//!
//! # Examples
//!
//! ```ignore
//! use skp_support::{LimiterConfig, PaginationConfig};
//!
//! // 3 login attempts per 5 minutes
//! let login = LimiterConfig::new("login", 3, 300);
//!
//! // 10 password resets per minute
//! let reset = LimiterConfig::per_minute("password-reset", 10);
//!
//! // Sortable by id or created_at, 20 or 50 rows per page
//! let pages = PaginationConfig::default()
//!     .with_limits([20, 50])
//!     .with_sorts(["id", "created_at"]);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::key::REAL_KEY_SEPARATOR;
use crate::pagination::Order;

/// Default maximum attempts per window.
pub const DEFAULT_MAX_ATTEMPTS: u64 = 3;

/// Default decay window in seconds.
pub const DEFAULT_DECAY_SECONDS: u64 = 300;

/// Default allowed page sizes.
pub const DEFAULT_LIMITS: [u64; 4] = [10, 25, 50, 100];

/// Attempt limiter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// Logical bucket, e.g. `"login"`.
    key: String,

    /// Attempts allowed before the actor is locked out.
    #[serde(default = "default_max_attempts")]
    max_attempts: u64,

    /// Seconds after the first attempt at which the counter resets.
    #[serde(default = "default_decay_seconds")]
    decay_seconds: u64,
}

fn default_max_attempts() -> u64 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_decay_seconds() -> u64 {
    DEFAULT_DECAY_SECONDS
}

impl LimiterConfig {
    /// Create a new limiter configuration.
    pub fn new(key: impl Into<String>, max_attempts: u64, decay_seconds: u64) -> Self {
        Self {
            key: key.into(),
            max_attempts,
            decay_seconds,
        }
    }

    /// Create a configuration allowing `n` attempts per minute.
    pub fn per_minute(key: impl Into<String>, n: u64) -> Self {
        Self::new(key, n, 60)
    }

    /// Create a configuration allowing `n` attempts per hour.
    pub fn per_hour(key: impl Into<String>, n: u64) -> Self {
        Self::new(key, n, 3600)
    }

    /// Try to create a new configuration, returning an error if invalid.
    ///
    /// The key must be non-empty and must not contain the `::` separator.
    pub fn try_new(key: impl Into<String>, max_attempts: u64, decay_seconds: u64) -> Result<Self> {
        let config = Self::new(key, max_attempts, decay_seconds);
        config.validate()?;
        Ok(config)
    }

    /// Create a new configuration builder.
    pub fn builder() -> LimiterConfigBuilder {
        LimiterConfigBuilder::new()
    }

    /// Check the key is usable as the first half of a real key.
    pub fn validate(&self) -> Result<()> {
        if self.key.is_empty() {
            return Err(ConfigError::InvalidLimiter("key must not be empty".into()).into());
        }
        if self.key.contains(REAL_KEY_SEPARATOR) {
            return Err(ConfigError::InvalidLimiter(format!(
                "key `{}` must not contain `{REAL_KEY_SEPARATOR}`",
                self.key
            ))
            .into());
        }
        Ok(())
    }

    /// Get the logical key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the maximum attempts.
    pub fn max_attempts(&self) -> u64 {
        self.max_attempts
    }

    /// Get the decay window in seconds.
    pub fn decay_seconds(&self) -> u64 {
        self.decay_seconds
    }

    /// Get the decay window.
    pub fn decay(&self) -> Duration {
        Duration::from_secs(self.decay_seconds)
    }
}

/// Builder for creating limiter configurations with validation.
#[derive(Debug, Default)]
pub struct LimiterConfigBuilder {
    key: Option<String>,
    max_attempts: Option<u64>,
    decay: Option<Duration>,
}

impl LimiterConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the logical key.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set the maximum attempts.
    pub fn max_attempts(mut self, n: u64) -> Self {
        self.max_attempts = Some(n);
        self
    }

    /// Set the decay window. Sub-second precision is truncated.
    pub fn decay(mut self, decay: Duration) -> Self {
        self.decay = Some(decay);
        self
    }

    /// Build the configuration, returning an error if invalid.
    pub fn build(self) -> Result<LimiterConfig> {
        let key = self
            .key
            .ok_or_else(|| ConfigError::InvalidLimiter("key is required".into()))?;

        LimiterConfig::try_new(
            key,
            self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
            self.decay.map_or(DEFAULT_DECAY_SECONDS, |d| d.as_secs()),
        )
    }
}

/// Paginator whitelists and defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Accepted page sizes, in preference order. Empty accepts any size >= 1.
    pub allowed_limits: Vec<u64>,
    /// Accepted sort fields. Empty accepts any field.
    pub allowed_sorts: Vec<String>,
    /// Page size before any parameter is applied.
    pub default_limit: u64,
    /// Sort field before any parameter is applied.
    pub default_sort: String,
    /// Sort direction before any parameter is applied.
    pub default_order: Order,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            allowed_limits: DEFAULT_LIMITS.to_vec(),
            allowed_sorts: Vec::new(),
            default_limit: DEFAULT_LIMITS[0],
            default_sort: "id".to_string(),
            default_order: Order::Asc,
        }
    }
}

impl PaginationConfig {
    /// Replace the accepted page sizes.
    ///
    /// The default page size moves to the first entry when it is no longer
    /// accepted.
    pub fn with_limits(mut self, limits: impl IntoIterator<Item = u64>) -> Self {
        self.allowed_limits = limits.into_iter().collect();
        if let Some(&first) = self.allowed_limits.first() {
            if !self.allowed_limits.contains(&self.default_limit) {
                self.default_limit = first;
            }
        }
        self
    }

    /// Replace the accepted sort fields.
    pub fn with_sorts<I, S>(mut self, sorts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_sorts = sorts.into_iter().map(Into::into).collect();
        self
    }

    /// Set the default sort field.
    pub fn with_default_sort(mut self, sort: impl Into<String>) -> Self {
        self.default_sort = sort.into();
        self
    }

    /// Set the default sort direction.
    pub fn with_default_order(mut self, order: Order) -> Self {
        self.default_order = order;
        self
    }

    /// Check the defaults satisfy the whitelists.
    pub fn validate(&self) -> Result<()> {
        if self.default_limit == 0 || self.allowed_limits.contains(&0) {
            return Err(ConfigError::InvalidPagination("page sizes must be at least 1".into()).into());
        }
        if !self.allowed_limits.is_empty() && !self.allowed_limits.contains(&self.default_limit) {
            return Err(ConfigError::InvalidPagination(format!(
                "default limit {} is not an allowed limit",
                self.default_limit
            ))
            .into());
        }
        if !self.allowed_sorts.is_empty() && !self.allowed_sorts.contains(&self.default_sort) {
            return Err(ConfigError::InvalidPagination(format!(
                "default sort `{}` is not an allowed sort",
                self.default_sort
            ))
            .into());
        }
        Ok(())
    }
}
