//! Error types for limiter and paginator operations.
//!
//! This module provides the error hierarchy shared by the crate: counter store
//! errors, configuration errors, backend connection errors and the programming
//! errors raised by the paginator accessors.

use std::time::Duration;
use thiserror::Error;

/// Result type for support operations.
pub type Result<T> = std::result::Result<T, SupportError>;

/// Main error type for support operations.
#[derive(Debug, Error)]
pub enum SupportError {
    /// Counter store error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Connection error (e.g., Redis connection failed).
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Identifier extraction error.
    #[error("Key extraction failed: {0}")]
    KeyExtraction(String),

    /// The bound data source failed to count or fetch rows.
    #[error("Data source error: {0}")]
    Source(String),

    /// An accessor name that ends in neither `Meta` nor `Tag`.
    #[error("{0} method not defined!")]
    UnknownAccessor(String),

    /// Envelope serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Counter store errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Generic storage operation failed.
    #[error("{message}")]
    OperationFailed {
        /// Error message.
        message: String,
        /// Whether the operation can be retried.
        retryable: bool,
    },

    /// Stored value could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Connection pool exhausted.
    #[error("Connection pool exhausted")]
    PoolExhausted,
}

impl StorageError {
    /// Create a new operation failed error.
    pub fn operation_failed(message: impl Into<String>, retryable: bool) -> Self {
        Self::OperationFailed {
            message: message.into(),
            retryable,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::OperationFailed { retryable, .. } => *retryable,
            Self::PoolExhausted => true,
            Self::Serialization(_) => false,
        }
    }
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid limiter configuration.
    #[error("Invalid limiter: {0}")]
    InvalidLimiter(String),

    /// Invalid pagination configuration.
    #[error("Invalid pagination: {0}")]
    InvalidPagination(String),

    /// The paginator was executed without a data source.
    #[error("Query is required and must have `count` and `paginate` operations")]
    MissingDataSource,
}

/// Connection-related errors.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Failed to connect.
    #[error("Failed to connect: {0}")]
    ConnectionFailed(String),

    /// Connection timeout.
    #[error("Connection timeout after {0:?}")]
    Timeout(Duration),
}
