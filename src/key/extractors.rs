//! Pre-built identifier extractors and request capability traits.
//!
//! These extractors are generic and can work with any request type
//! that provides the necessary data through traits.

use std::collections::HashMap;
use std::net::IpAddr;

use crate::key::Key;

// ============================================================================
// Request Info Traits
// ============================================================================

/// Trait for requests that have an IP address.
pub trait HasIpAddr {
    /// Get the client IP address.
    fn client_ip(&self) -> Option<IpAddr>;
}

/// Trait for requests that have headers.
pub trait HasHeaders {
    /// Get a header value by name.
    fn header(&self, name: &str) -> Option<&str>;
}

/// Trait for requests that carry query or form parameters.
pub trait HasQueryParams {
    /// Get a raw parameter value by name.
    fn query_param(&self, name: &str) -> Option<&str>;
}

impl HasQueryParams for HashMap<String, String> {
    fn query_param(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl HasQueryParams for [(&str, &str)] {
    fn query_param(&self, name: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == name).map(|(_, v)| *v)
    }
}

impl<const N: usize> HasQueryParams for [(&str, &str); N] {
    fn query_param(&self, name: &str) -> Option<&str> {
        self.as_slice().query_param(name)
    }
}

// ============================================================================
// IP-based Extractors
// ============================================================================

/// Extract the client IP address as the identifier.
///
/// The identifier is the bare address (`"203.0.113.50"`), so the real key of
/// a `"login"` limiter reads `"login::203.0.113.50"`.
#[derive(Debug, Clone, Default)]
pub struct IpKey {
    /// Header to check for real IP (e.g., X-Forwarded-For).
    real_ip_header: Option<&'static str>,
}

impl IpKey {
    /// Create a new IP key extractor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use X-Forwarded-For header to get real IP behind proxy.
    pub fn with_forwarded_for() -> Self {
        Self {
            real_ip_header: Some("x-forwarded-for"),
        }
    }

    /// Use X-Real-IP header.
    pub fn with_real_ip() -> Self {
        Self {
            real_ip_header: Some("x-real-ip"),
        }
    }

    /// Use a custom header for real IP.
    pub fn with_header(header: &'static str) -> Self {
        Self {
            real_ip_header: Some(header),
        }
    }
}

impl<R> Key<R> for IpKey
where
    R: HasIpAddr + HasHeaders,
{
    fn extract(&self, request: &R) -> Option<String> {
        if let Some(header) = self.real_ip_header {
            if let Some(value) = request.header(header) {
                // X-Forwarded-For might have multiple IPs, take the first
                let ip = value.split(',').next().map(str::trim).unwrap_or_default();
                if !ip.is_empty() {
                    return Some(ip.to_string());
                }
            }
        }

        request.client_ip().map(|ip| ip.to_string())
    }

    fn name(&self) -> &'static str {
        "ip"
    }
}

// ============================================================================
// Header-based Extractors
// ============================================================================

/// Extract the identifier from a specific header.
#[derive(Debug, Clone)]
pub struct HeaderKey {
    header_name: &'static str,
}

impl HeaderKey {
    /// Create a new header key extractor.
    pub fn new(header_name: &'static str) -> Self {
        Self { header_name }
    }

    /// Extract from X-API-Key header.
    pub fn api_key() -> Self {
        Self::new("x-api-key")
    }
}

impl<R: HasHeaders> Key<R> for HeaderKey {
    fn extract(&self, request: &R) -> Option<String> {
        request
            .header(self.header_name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| format!("{}:{}", self.header_name, v))
    }

    fn name(&self) -> &'static str {
        "header"
    }
}
