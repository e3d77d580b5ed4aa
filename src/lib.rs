//! Request-scoped support services for web applications.
//!
//! `skp_support` provides two small building blocks that sit next to a
//! request handler:
//!
//! - **Attempt limiting**: a [`RateLimiter`] counts attempts per
//!   `"{key}::{identifier}"` within a decay window and reports lockout,
//!   remaining retries and the time until the window resets
//! - **Pagination**: a [`Paginator`] validates `page`/`limit`/`sort`/`order`
//!   against whitelists, runs a [`DataSource`] and wraps the page in a
//!   `{meta, pagination, data}` envelope with an opaque, client-roundtripped
//!   tag bag
//!
//! Counters live in a shared [`Storage`] backend: in-memory with garbage
//! collection, or Redis with connection pooling.
//!
//! # Quick Start
//!
//! ```ignore
//! use skp_support::{MemoryStorage, RateLimiter, StorageCounter};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> skp_support::Result<()> {
//!     let store = Arc::new(StorageCounter::new(MemoryStorage::new()));
//!
//!     let mut limiter = RateLimiter::new(store.clone(), "203.0.113.50");
//!     limiter.init("login", 5, 60);
//!
//!     if limiter.must_lock().await? {
//!         println!("locked for {}s", limiter.available_in().await?);
//!     } else if !password_matches() {
//!         limiter.add_attempts().await?;
//!     } else {
//!         limiter.reset().await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Feature Flags
//!
//! - `memory` (default): In-memory storage with garbage collection
//! - `redis`: Redis storage backend
//! - `axum`: Axum request adapters

pub mod config;
pub mod counter;
pub mod error;
pub mod headers;
pub mod key;
pub mod limiter;
pub mod pagination;
pub mod storage;

#[cfg(feature = "axum")]
pub mod integration;

// Re-export main types
pub use config::{LimiterConfig, LimiterConfigBuilder, PaginationConfig};
pub use counter::{CounterStore, StorageCounter};
pub use error::{ConfigError, ConnectionError, Result, StorageError, SupportError};
pub use headers::RateLimitHeaders;
pub use key::{FnKey, HeaderKey, IpKey, Key, StaticKey};
pub use limiter::{LimitStatus, RateLimiter};
pub use storage::{Storage, StorageEntry};

// Re-export pagination types
pub use pagination::{
    DataSource, JsonFormat, Order, Page, PageParams, PaginatedResponse, Paginator, TagBag,
    VecSource,
};

// Re-export storage types
#[cfg(feature = "memory")]
pub use storage::{GcConfig, GcInterval, MemoryStorage};

#[cfg(feature = "redis")]
pub use storage::{RedisConfig, RedisStorage};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::counter::{CounterStore, StorageCounter};
    pub use crate::error::{Result, SupportError};
    pub use crate::limiter::RateLimiter;
    pub use crate::pagination::{DataSource, JsonFormat, Order, PageParams, Paginator};
    pub use crate::storage::Storage;

    #[cfg(feature = "memory")]
    pub use crate::storage::{GcConfig, GcInterval, MemoryStorage};
}
