//! In-memory result cache with lazy TTL expiry

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use super::types::CacheKey;
use crate::config::CacheConfig;
use crate::stats::ResultSet;

/// A cached result and when it was stored
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub result: Arc<ResultSet>,
    pub inserted_at: Instant,
}

impl CacheEntry {
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.inserted_at)
    }
}

/// Whether `entry` is younger than `ttl` at `now`
pub fn is_fresh(entry: &CacheEntry, now: Instant, ttl: Duration) -> bool {
    entry.age(now) < ttl
}

/// Last good result per (release, language).
///
/// Entries are replaced whole and never partially updated. Expired entries
/// are kept, since they are still served when a refresh fails.
pub struct StatusCache {
    entries: DashMap<CacheKey, CacheEntry>,
    ttl: Duration,
    max_entries: usize,
}

impl StatusCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.ttl(), config.max_entries)
    }

    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Entry for `key` if it has not expired
    pub fn get_fresh(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.get(key)
            .filter(|entry| is_fresh(entry, Instant::now(), self.ttl))
    }

    pub fn is_fresh(&self, entry: &CacheEntry) -> bool {
        is_fresh(entry, Instant::now(), self.ttl)
    }

    /// Store `result`, evicting the oldest entry when full
    pub fn put(&self, key: CacheKey, result: Arc<ResultSet>) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.evict_oldest();
        }
        self.entries.insert(
            key,
            CacheEntry {
                result,
                inserted_at: Instant::now(),
            },
        );
    }

    fn evict_oldest(&self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().inserted_at)
            .map(|entry| entry.key().clone());
        if let Some(key) = oldest {
            tracing::debug!("Evicting cached status for {}", key);
            self.entries.remove(&key);
        }
    }

    pub fn remove(&self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn result(distribution: &str) -> Arc<ResultSet> {
        Arc::new(ResultSet {
            distribution: distribution.to_string(),
            language: "sv".to_string(),
            fetched_at: Utc::now(),
            packages: Vec::new(),
            summary: Default::default(),
            dropped: 0,
            empty: 0,
            warnings: 0,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = StatusCache::new(Duration::from_secs(60), 8);
        let key = CacheKey::new("noble", "sv");
        cache.put(key.clone(), result("noble"));
        assert!(cache.get_fresh(&key).is_some());

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(cache.get_fresh(&key).is_none());
        // Expired entries stay available for stale fallback
        assert!(cache.get(&key).is_some());
    }

    #[test]
    fn test_is_fresh_boundary() {
        let now = Instant::now();
        let entry = CacheEntry {
            result: result("noble"),
            inserted_at: now,
        };
        let ttl = Duration::from_secs(10);
        assert!(is_fresh(&entry, now + Duration::from_secs(9), ttl));
        assert!(!is_fresh(&entry, now + Duration::from_secs(10), ttl));
    }

    #[tokio::test(start_paused = true)]
    async fn test_oldest_entry_is_evicted() {
        let cache = StatusCache::new(Duration::from_secs(60), 2);
        cache.put(CacheKey::new("noble", "sv"), result("noble"));
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.put(CacheKey::new("focal", "sv"), result("focal"));
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.put(CacheKey::new("plucky", "sv"), result("plucky"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&CacheKey::new("noble", "sv")).is_none());
        assert!(cache.get(&CacheKey::new("plucky", "sv")).is_some());
    }

    #[test]
    fn test_replace_does_not_evict() {
        let cache = StatusCache::new(Duration::from_secs(60), 1);
        let key = CacheKey::new("noble", "sv");
        cache.put(key.clone(), result("noble"));
        cache.put(key.clone(), result("noble"));
        assert_eq!(cache.len(), 1);
        assert!(cache.remove(&key));
        assert!(!cache.remove(&key));
        assert!(cache.is_empty());
    }
}
