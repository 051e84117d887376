use crate::clock::{Clock, SystemClock};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Error returned by a [`Cache`] implementation.
///
/// The client never fails an operation because of it, a failing read is
/// handled like a miss and a failing write is only logged.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct CacheError(pub String);

/// Key-value store remembering *when* a key was confirmed.
///
/// Implementations must be safe to call concurrently. Entries are only
/// ever created, the client neither updates nor deletes them; expiry is
/// decided by the client from the returned timestamp.
pub trait Cache: Send + Sync {
    /// Insertion time of `key`, or `None` if it was never stored.
    fn get(&self, key: &str) -> Result<Option<DateTime<Utc>>, CacheError>;

    /// Records `key` as confirmed now.
    fn set(&self, key: &str) -> Result<(), CacheError>;
}

/// Configuration for [`MemoryCache`]
#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// Age after which an entry is dropped first when the cache is full
    pub max_age: Duration,
    /// Maximum number of cached entries
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age: Duration::hours(24),
            max_entries: 10_000,
        }
    }
}

/// In-memory cache implementation using DashMap for thread safety
pub struct MemoryCache {
    entries: DashMap<String, DateTime<Utc>>,
    clock: Arc<dyn Clock>,
    pub config: CacheConfig,
}

impl MemoryCache {
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
            config,
        }
    }

    fn is_expired(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - created_at > self.config.max_age
    }

    /// Remove expired entries from cache
    pub fn evict_expired(&self) {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries
            .retain(|_, created_at| now - *created_at <= self.config.max_age);

        log::debug!(
            "Evicted {} expired cache entries",
            before.saturating_sub(self.entries.len())
        );
    }

    /// Remove oldest entries when at capacity
    fn evict_oldest(&self) {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();

        // Oldest first
        entries.sort_by_key(|(_, created_at)| *created_at);

        // Remove oldest 25% of entries
        let to_remove = (self.config.max_entries / 4).max(1);
        for (key, _) in entries.into_iter().take(to_remove) {
            self.entries.remove(&key);
        }

        log::debug!("Evicted {} oldest cache entries", to_remove);
    }

    /// Clear all cache entries
    pub fn clear(&self) {
        self.entries.clear();
        log::info!("Cache cleared");
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let total_entries = self.entries.len();
        let expired_entries = self
            .entries
            .iter()
            .filter(|entry| self.is_expired(*entry.value(), now))
            .count();

        CacheStats {
            total_entries,
            valid_entries: total_entries - expired_entries,
            expired_entries,
            max_entries: self.config.max_entries,
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<DateTime<Utc>>, CacheError> {
        Ok(self.entries.get(key).map(|entry| *entry.value()))
    }

    fn set(&self, key: &str) -> Result<(), CacheError> {
        if self.entries.len() >= self.config.max_entries && !self.entries.contains_key(key) {
            self.evict_expired();

            // If still at capacity, remove oldest entries
            if self.entries.len() >= self.config.max_entries {
                self.evict_oldest();
            }
        }

        self.entries.insert(key.to_string(), self.clock.now());
        Ok(())
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    pub max_entries: usize,
}

/// Thread-safe wrapper for the cache
pub type SharedCache = Arc<dyn Cache>;
