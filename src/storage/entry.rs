//! Storage entry type for attempt counters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Entry stored in the storage backend.
///
/// A counter together with the moment its window closes. Entries past
/// `expires_at` are treated as absent by every backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StorageEntry {
    /// Attempts recorded in the current window.
    pub count: u64,

    /// Window expiry timestamp (Unix milliseconds).
    pub expires_at: u64,
}

impl StorageEntry {
    /// Create a new storage entry.
    pub fn new(count: u64, expires_at: u64) -> Self {
        Self { count, expires_at }
    }

    /// Create an entry whose window closes `ttl` after `now`.
    pub fn starting_at(count: u64, now: u64, ttl: Duration) -> Self {
        Self::new(count, now.saturating_add(ttl.as_millis() as u64))
    }

    /// Check whether the window has closed at `now`.
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at <= now
    }

    /// Time left in the window at `now`.
    pub fn remaining(&self, now: u64) -> Duration {
        Duration::from_millis(self.expires_at.saturating_sub(now))
    }
}
