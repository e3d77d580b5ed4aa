//! In-memory storage with automatic garbage collection.
//!
//! This storage backend uses `DashMap` for thread-safe concurrent access
//! and includes configurable garbage collection to prevent memory growth.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::error::Result;
use crate::storage::{current_timestamp_ms, Storage, StorageEntry};

/// Garbage collection interval configuration.
#[derive(Debug, Clone)]
pub enum GcInterval {
    /// Run GC every N requests.
    Requests(u64),
    /// Run GC at fixed time intervals.
    Duration(Duration),
    /// Disable automatic GC.
    Manual,
}

impl Default for GcInterval {
    fn default() -> Self {
        Self::Requests(10000)
    }
}

/// Garbage collection configuration.
#[derive(Debug, Clone, Default)]
pub struct GcConfig {
    /// When to trigger GC.
    pub interval: GcInterval,
}

impl GcConfig {
    /// Create config with request-based GC.
    pub fn on_requests(count: u64) -> Self {
        Self {
            interval: GcInterval::Requests(count),
        }
    }

    /// Create config with time-based GC.
    ///
    /// The sweeper is a Tokio task, so this must be called inside a runtime.
    pub fn on_duration(interval: Duration) -> Self {
        Self {
            interval: GcInterval::Duration(interval),
        }
    }

    /// Create config with manual GC only.
    pub fn manual() -> Self {
        Self {
            interval: GcInterval::Manual,
        }
    }
}

/// In-memory storage with garbage collection.
///
/// Counters live in a shared `DashMap`; closed windows are dropped lazily on
/// read and in bulk by the garbage collector.
///
/// # Example
///
/// ```ignore
/// use skp_support::storage::{MemoryStorage, GcConfig};
/// use std::time::Duration;
///
/// // Default GC (every 10000 requests)
/// let storage = MemoryStorage::new();
///
/// // Custom GC interval
/// let storage = MemoryStorage::with_gc(GcConfig::on_duration(Duration::from_secs(60)));
///
/// // Manual GC only
/// let storage = MemoryStorage::with_gc(GcConfig::manual());
/// storage.run_gc().await;
/// ```
pub struct MemoryStorage {
    data: Arc<DashMap<String, StorageEntry>>,
    gc_config: GcConfig,
    request_count: AtomicU64,
    gc_lock: Mutex<()>,
    shutdown: Arc<Notify>,
}

impl std::fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("entries", &self.data.len())
            .field("gc_config", &self.gc_config)
            .finish()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    /// Create a new memory storage with default GC configuration.
    pub fn new() -> Self {
        Self::with_gc(GcConfig::default())
    }

    /// Create a new memory storage with custom GC configuration.
    pub fn with_gc(gc_config: GcConfig) -> Self {
        let storage = Self {
            data: Arc::new(DashMap::new()),
            gc_config: gc_config.clone(),
            request_count: AtomicU64::new(0),
            gc_lock: Mutex::new(()),
            shutdown: Arc::new(Notify::new()),
        };

        if let GcInterval::Duration(interval) = gc_config.interval {
            storage.start_gc_task(interval);
        }

        storage
    }

    /// Start background GC task.
    fn start_gc_task(&self, interval: Duration) {
        let data = Arc::clone(&self.data);
        let shutdown = Arc::clone(&self.shutdown);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {
                        run_gc_on_map(&data);
                    }
                    _ = shutdown.notified() => {
                        break;
                    }
                }
            }
        });
    }

    /// Manually trigger garbage collection.
    pub async fn run_gc(&self) {
        run_gc_on_map(&self.data);
    }

    /// Get the number of entries currently stored, including closed windows
    /// not yet collected.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the storage is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.data.clear();
    }

    /// Check if GC should run and run it if needed.
    fn maybe_run_gc(&self) {
        if let GcInterval::Requests(threshold) = self.gc_config.interval {
            let count = self.request_count.fetch_add(1, Ordering::Relaxed);
            if threshold > 0 && count % threshold == 0 && count > 0 {
                // Skip if another caller is already sweeping
                if let Some(_guard) = self.gc_lock.try_lock() {
                    run_gc_on_map(&self.data);
                }
            }
        }
    }
}

impl Drop for MemoryStorage {
    fn drop(&mut self) {
        self.shutdown.notify_waiters();
    }
}

/// Drop every entry whose window has closed.
fn run_gc_on_map(data: &DashMap<String, StorageEntry>) {
    let now = current_timestamp_ms();
    let before = data.len();
    data.retain(|_, entry| !entry.is_expired(now));
    tracing::trace!(removed = before.saturating_sub(data.len()), "memory storage gc pass");
}

impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<StorageEntry>> {
        self.maybe_run_gc();

        let now = current_timestamp_ms();
        if let Some(entry) = self.data.get(key) {
            if !entry.is_expired(now) {
                return Ok(Some(*entry));
            }
            drop(entry);
            self.data.remove_if(key, |_, e| e.is_expired(now));
        }
        Ok(None)
    }

    async fn increment(&self, key: &str, delta: u64, ttl: Duration) -> Result<StorageEntry> {
        self.maybe_run_gc();

        let now = current_timestamp_ms();
        let entry = *self
            .data
            .entry(key.to_string())
            .and_modify(|entry| {
                if entry.is_expired(now) {
                    *entry = StorageEntry::starting_at(delta, now, ttl);
                } else {
                    entry.count = entry.count.saturating_add(delta);
                }
            })
            .or_insert_with(|| StorageEntry::starting_at(delta, now, ttl));

        Ok(entry)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.data.remove(key);
        Ok(())
    }
}
