//! Axum request adapters.
//!
//! [`AxumRequest`] borrows an inbound `http::Request` and exposes it through
//! the capability traits the key extractors and [`PageParams`] read from.
//! The peer address comes from axum's `ConnectInfo<SocketAddr>` extension,
//! so the router must be served with
//! `into_make_service_with_connect_info::<SocketAddr>()` for [`IpKey`] to
//! fall back to it.
//!
//! # Example
//!
//! ```ignore
//! use axum::extract::Request;
//! use skp_support::{integration::AxumRequest, IpKey, PageParams, RateLimiter};
//!
//! async fn login(request: Request) -> impl IntoResponse {
//!     let adapter = AxumRequest::new(&request);
//!     let mut limiter = RateLimiter::from_request(store.clone(), &adapter, &IpKey::new())?;
//!     limiter.init("login", 5, 60);
//!     // ...
//! }
//! ```
//!
//! [`IpKey`]: crate::key::IpKey

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, Query};
use http::Request;

use crate::key::{HasHeaders, HasIpAddr, HasQueryParams};
#[cfg(doc)]
use crate::pagination::PageParams;

/// Borrowed view of an axum request with its query string decoded.
#[derive(Debug)]
pub struct AxumRequest<'a, B> {
    request: &'a Request<B>,
    query: HashMap<String, String>,
}

impl<'a, B> AxumRequest<'a, B> {
    /// Wrap a request. An undecodable query string reads as empty.
    pub fn new(request: &'a Request<B>) -> Self {
        let query = match Query::<HashMap<String, String>>::try_from_uri(request.uri()) {
            Ok(Query(query)) => query,
            Err(err) => {
                tracing::debug!(error = %err, "ignoring undecodable query string");
                HashMap::new()
            }
        };
        Self { request, query }
    }

    /// Get the wrapped request.
    pub fn request(&self) -> &Request<B> {
        self.request
    }
}

impl<B> HasHeaders for AxumRequest<'_, B> {
    fn header(&self, name: &str) -> Option<&str> {
        self.request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
    }
}

impl<B> HasIpAddr for AxumRequest<'_, B> {
    fn client_ip(&self) -> Option<IpAddr> {
        self.request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
    }
}

impl<B> HasQueryParams for AxumRequest<'_, B> {
    fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }
}
