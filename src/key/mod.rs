//! Actor identifiers for attempt limiting.
//!
//! This module provides the `Key` trait for deriving the identifier an
//! attempt counter is bound to (usually the client IP) from a request, along
//! with pre-built extractors for common patterns.
//!
//! # Overview
//!
//! The identifier is appended to the limiter's logical key to form the real
//! counting key `"{key}::{identifier}"`:
//! - Limit by IP address: every request from the same IP shares a counter
//! - Limit by API key: every request with the same header value shares one
//!
//! # Example
//!
//! ```ignore
//! use skp_support::key::{Key, IpKey};
//!
//! // Client IP, honouring X-Forwarded-For behind a proxy
//! let ip_key = IpKey::with_forwarded_for();
//! let identifier = ip_key.extract(&request);
//! ```

mod extractors;

pub use extractors::*;

/// Separator between the logical key and the actor identifier.
pub const REAL_KEY_SEPARATOR: &str = "::";

/// Compose the real counting key `"{key}::{identifier}"`.
pub fn real_key(key: &str, identifier: &str) -> String {
    format!("{key}{REAL_KEY_SEPARATOR}{identifier}")
}

/// Trait for extracting actor identifiers from requests.
///
/// Return `None` if the identifier cannot be extracted (e.g., missing header).
///
/// # Type Parameters
///
/// - `R`: The request type (e.g., `axum::extract::Request`)
pub trait Key<R>: Send + Sync + 'static {
    /// Extract an identifier from the request.
    fn extract(&self, request: &R) -> Option<String>;

    /// Get the key name for logging.
    fn name(&self) -> &'static str;
}

/// A key that extracts a specific field from the request.
///
/// This is a generic extractor that can be configured with a closure.
#[derive(Clone)]
pub struct FnKey<F> {
    extractor: F,
    name: &'static str,
}

impl<F> std::fmt::Debug for FnKey<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnKey").field("name", &self.name).finish()
    }
}

impl<F> FnKey<F> {
    /// Create a new function-based key extractor.
    pub fn new(name: &'static str, extractor: F) -> Self {
        Self { extractor, name }
    }
}

impl<R, F> Key<R> for FnKey<F>
where
    F: Fn(&R) -> Option<String> + Send + Sync + 'static,
{
    fn extract(&self, request: &R) -> Option<String> {
        (self.extractor)(request)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// A key that always returns a static value.
#[derive(Debug, Clone)]
pub struct StaticKey {
    key: String,
}

impl StaticKey {
    /// Create a new static key.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl<R> Key<R> for StaticKey {
    fn extract(&self, _request: &R) -> Option<String> {
        Some(self.key.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
