//! The cache tier used by the record service.
//!
//! Wraps a [`KeyValueCache`] and absorbs its failures: reads degrade to a
//! miss and writes are logged and dropped. The durable store stays the source
//! of truth, so a broken cache slows requests down but never fails them.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::document::CacheEntry;

use super::key_value_cache::{KeyValueCache, Result, ScanCursor};

/// Default number of keys examined per scan round-trip.
pub const DEFAULT_SCAN_PAGE_SIZE: usize = 100;

/// Best-effort access to the cache, in terms of JSON values.
#[derive(Clone)]
pub struct CacheTier {
    cache: Arc<dyn KeyValueCache>,
    scan_page_size: usize,
}

impl CacheTier {
    /// Create a cache tier over `cache`, scanning `scan_page_size` keys per round-trip.
    pub fn new(cache: Arc<dyn KeyValueCache>, scan_page_size: usize) -> Self {
        Self {
            cache,
            scan_page_size: scan_page_size.max(1),
        }
    }

    /// Look up a cached value.
    ///
    /// Connection failures and undecodable values are reported as a miss.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let raw = match self.cache.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key, "cache miss");
                return None;
            }
            Err(e) => {
                warn!(key, error = %e, "cache read failed, falling back to store");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key, "cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(key, error = %e, "ignoring undecodable cache entry");
                None
            }
        }
    }

    /// Store entries one by one, logging and skipping any that fail.
    ///
    /// Returns the number of entries stored.
    pub async fn set_entries(&self, entries: &[CacheEntry]) -> usize {
        let mut stored = 0;
        for entry in entries {
            match self.cache.set(&entry.key, &entry.value).await {
                Ok(()) => stored += 1,
                Err(e) => {
                    warn!(key = %entry.key, error = %e, "cache write failed");
                }
            }
        }
        debug!(stored, total = entries.len(), "populated cache");
        stored
    }

    /// Delete keys, logging any failure.
    pub async fn evict(&self, keys: &[String]) {
        if keys.is_empty() {
            return;
        }
        if let Err(e) = self.cache.delete(keys).await {
            warn!(count = keys.len(), error = %e, "cache eviction failed");
        }
    }

    /// Delete every key matching `pattern`, logging any failure.
    pub async fn evict_matching(&self, pattern: &str) {
        if let Err(e) = self.flush(pattern).await {
            warn!(pattern, error = %e, "cache eviction failed");
        }
    }

    /// List every key matching `pattern`, draining the scan cursor.
    pub async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut cursor = ScanCursor::Start;
        loop {
            let page = self
                .cache
                .scan(&cursor, pattern, self.scan_page_size)
                .await?;
            keys.extend(page.keys);
            if page.cursor == ScanCursor::Done {
                return Ok(keys);
            }
            cursor = page.cursor;
        }
    }

    /// Fetch a raw cached value without decoding it.
    pub async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        self.cache.get(key).await
    }

    /// Delete every key matching `pattern`, one scan page at a time.
    ///
    /// Unlike the other operations, failures are returned: clearing the cache
    /// is the whole point of the call. Returns the number of keys deleted.
    pub async fn flush(&self, pattern: &str) -> Result<usize> {
        let mut deleted = 0;
        let mut cursor = ScanCursor::Start;
        loop {
            let page = self
                .cache
                .scan(&cursor, pattern, self.scan_page_size)
                .await?;
            if !page.keys.is_empty() {
                deleted += self.cache.delete(&page.keys).await?;
            }
            if page.cursor == ScanCursor::Done {
                return Ok(deleted);
            }
            cursor = page.cursor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caches::MemoryKeyValueCache;
    use serde_json::json;

    fn tier(cache: &Arc<MemoryKeyValueCache>, page_size: usize) -> CacheTier {
        CacheTier::new(cache.clone(), page_size)
    }

    fn entry(key: &str, value: &str) -> CacheEntry {
        CacheEntry {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = Arc::new(MemoryKeyValueCache::new());
        let tier = tier(&cache, 10);

        let stored = tier
            .set_entries(&[entry("ns::a", r#"{"b":1}"#), entry("ns::a.b", "1")])
            .await;
        assert_eq!(stored, 2);

        assert_eq!(tier.get("ns::a").await, Some(json!({"b": 1})));
        assert_eq!(tier.get("ns::a.b").await, Some(json!(1)));
        assert_eq!(tier.get("ns::missing").await, None);
    }

    #[tokio::test]
    async fn test_failures_degrade_to_miss() {
        let cache = Arc::new(MemoryKeyValueCache::new());
        let tier = tier(&cache, 10);
        tier.set_entries(&[entry("ns::a", "1")]).await;

        cache.set_available(false);
        assert_eq!(tier.get("ns::a").await, None);
        assert_eq!(tier.set_entries(&[entry("ns::b", "2")]).await, 0);
        tier.evict(&["ns::a".to_string()]).await;

        cache.set_available(true);
        assert_eq!(tier.get("ns::a").await, Some(json!(1)));
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_a_miss() {
        let cache = Arc::new(MemoryKeyValueCache::new());
        cache.set("ns::bad", "{not json").await.unwrap();

        assert_eq!(tier(&cache, 10).get("ns::bad").await, None);
    }

    #[tokio::test]
    async fn test_flush_deletes_matching_keys_in_pages() {
        let cache = Arc::new(MemoryKeyValueCache::new());
        for i in 0..25 {
            cache.set(&format!("ns::{:02}", i), "1").await.unwrap();
        }
        cache.set("keep::me", "1").await.unwrap();

        let tier = tier(&cache, 4);
        assert_eq!(tier.flush("ns::*").await.unwrap(), 25);
        assert_eq!(cache.snapshot().len(), 1);

        // A second flush finds nothing to do.
        assert_eq!(tier.flush("ns::*").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_flush_reports_failure() {
        let cache = Arc::new(MemoryKeyValueCache::new());
        cache.set_available(false);
        assert!(tier(&cache, 10).flush("ns::*").await.is_err());
    }

    #[tokio::test]
    async fn test_scan_keys() {
        let cache = Arc::new(MemoryKeyValueCache::new());
        for key in ["ns::b", "ns::a", "x::c"] {
            cache.set(key, "1").await.unwrap();
        }

        let keys = tier(&cache, 1).scan_keys("ns::*").await.unwrap();
        assert_eq!(keys, vec!["ns::a", "ns::b"]);
    }

    #[tokio::test]
    async fn test_evict_matching() {
        let cache = Arc::new(MemoryKeyValueCache::new());
        for key in ["ns::a", "ns::a.b", "ns::a.b.c", "ns::ab"] {
            cache.set(key, "1").await.unwrap();
        }

        tier(&cache, 2).evict_matching("ns::a.*").await;

        let remaining: Vec<String> = cache.snapshot().into_keys().collect();
        assert_eq!(remaining, vec!["ns::a", "ns::ab"]);
    }
}
