//! Time-range keyed cache of analytics bundles.
//!
//! One entry per bucket, replaced whole on refresh. Entries older than the TTL
//! are treated exactly like absent ones and are overwritten on the next fill;
//! there is no background sweep.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::models::{AnalyticsBundle, TimeRange};

/// Default time-to-live for cached bundles (5 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// A cached bundle and when it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub bundle: AnalyticsBundle,
    pub cached_at: DateTime<Utc>,
    stored_at: Instant,
}

impl CacheEntry {
    fn new(bundle: AnalyticsBundle) -> Self {
        Self {
            bundle,
            cached_at: Utc::now(),
            stored_at: Instant::now(),
        }
    }

    /// Time since the entry was stored.
    pub fn age(&self) -> Duration {
        self.stored_at.elapsed()
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() >= ttl
    }
}

/// Bundle cache keyed by time range.
#[derive(Debug)]
pub struct AnalyticsCache {
    entries: RwLock<HashMap<TimeRange, CacheEntry>>,
    ttl: Duration,
}

impl AnalyticsCache {
    /// Create a cache with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached bundle if present and younger than the TTL.
    pub async fn get(&self, range: TimeRange) -> Option<AnalyticsBundle> {
        let entries = self.entries.read().await;
        entries
            .get(&range)
            .filter(|entry| !entry.is_expired(self.ttl))
            .map(|entry| entry.bundle.clone())
    }

    /// Stores `bundle` for `range`, replacing any previous entry.
    pub async fn put(&self, range: TimeRange, bundle: AnalyticsBundle) {
        let mut entries = self.entries.write().await;
        entries.insert(range, CacheEntry::new(bundle));
    }

    /// Returns the raw entry for `range`, stale or not.
    pub async fn entry(&self, range: TimeRange) -> Option<CacheEntry> {
        self.entries.read().await.get(&range).cloned()
    }

    /// Drops the entry for `range`. Returns whether one existed.
    pub async fn invalidate(&self, range: TimeRange) -> bool {
        self.entries.write().await.remove(&range).is_some()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of stored entries, including stale ones.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for AnalyticsCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}
