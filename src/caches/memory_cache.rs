//! In-memory key-value cache.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use super::key_value_cache::{CacheError, KeyValueCache, Result, ScanCursor, ScanPage};

/// An in-memory implementation of `KeyValueCache`, intended primarily for testing.
///
/// Keys are kept ordered so that a scan can resume after the last key it
/// returned, even when keys are deleted between pages. The cache can be
/// switched off to simulate an unreachable server.
pub struct MemoryKeyValueCache {
    entries: RwLock<BTreeMap<String, String>>,
    available: AtomicBool,
}

impl MemoryKeyValueCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Make every operation fail (or succeed again) with a connection error.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Snapshot of every entry, bypassing availability.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.read().unwrap().clone()
    }

    fn check_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CacheError::Connection("cache unavailable".to_string()))
        }
    }
}

impl Default for MemoryKeyValueCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueCache for MemoryKeyValueCache {
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_available()?;
        let mut entries = self.entries.write().unwrap();
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;
        let entries = self.entries.read().unwrap();
        Ok(entries.get(key).cloned())
    }

    async fn delete(&self, keys: &[String]) -> Result<usize> {
        self.check_available()?;
        let mut entries = self.entries.write().unwrap();
        Ok(keys.iter().filter(|key| entries.remove(*key).is_some()).count())
    }

    async fn scan(&self, cursor: &ScanCursor, pattern: &str, count: usize) -> Result<ScanPage> {
        self.check_available()?;

        let lower = match cursor {
            ScanCursor::Start => Bound::Unbounded,
            ScanCursor::Continue(after) => Bound::Excluded(after.as_str()),
            ScanCursor::Done => {
                return Ok(ScanPage {
                    keys: Vec::new(),
                    cursor: ScanCursor::Done,
                });
            }
        };

        let entries = self.entries.read().unwrap();
        let mut candidates = entries
            .range::<str, _>((lower, Bound::Unbounded))
            .map(|(key, _)| key)
            .peekable();

        // Like Redis, `count` bounds the keys examined, not the keys returned.
        let mut keys = Vec::new();
        let mut last = None;
        for _ in 0..count.max(1) {
            let Some(key) = candidates.next() else {
                break;
            };
            if glob_match(pattern, key) {
                keys.push(key.clone());
            }
            last = Some(key.clone());
        }

        let cursor = match (last, candidates.peek()) {
            (Some(last), Some(_)) => ScanCursor::Continue(last),
            _ => ScanCursor::Done,
        };

        Ok(ScanPage { keys, cursor })
    }
}

/// Match `text` against a Redis-style glob.
///
/// Supports `*`, `?` and backslash escapes; other characters match literally.
pub(crate) fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() {
            match p[pi] {
                '*' => {
                    star = Some((pi, ti));
                    pi += 1;
                    continue;
                }
                '?' => {
                    pi += 1;
                    ti += 1;
                    continue;
                }
                '\\' if pi + 1 < p.len() => {
                    if p[pi + 1] == t[ti] {
                        pi += 2;
                        ti += 1;
                        continue;
                    }
                }
                c => {
                    if c == t[ti] {
                        pi += 1;
                        ti += 1;
                        continue;
                    }
                }
            }
        }

        // Mismatch: let the most recent star swallow one more character.
        match star {
            Some((star_pi, star_ti)) => {
                pi = star_pi + 1;
                ti = star_ti + 1;
                star = Some((star_pi, star_ti + 1));
            }
            None => return false,
        }
    }

    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_match() {
        assert!(glob_match("service_data::*", "service_data::a"));
        assert!(glob_match("service_data::*", "service_data::"));
        assert!(!glob_match("service_data::*", "other::a"));
        assert!(glob_match("a?c", "abc"));
        assert!(!glob_match("a?c", "ac"));
        assert!(glob_match("*.port", "svc.port"));
        assert!(glob_match("a*b*c", "axxbyyc"));
        assert!(!glob_match("a*b*c", "axxbyy"));
    }

    #[test]
    fn test_glob_escapes() {
        assert!(glob_match(r"a\*b", "a*b"));
        assert!(!glob_match(r"a\*b", "axb"));
        assert!(glob_match(r"service_data::a\\.b.*", r"service_data::a\.b.x"));
        assert!(!glob_match(r"service_data::a\\.b.*", r"service_data::a\.b"));
    }

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = MemoryKeyValueCache::new();
        cache.set("k1", "v1").await.unwrap();
        cache.set("k2", "v2").await.unwrap();

        assert_eq!(cache.get("k1").await.unwrap(), Some("v1".to_string()));
        assert_eq!(cache.get("missing").await.unwrap(), None);

        let deleted = cache
            .delete(&["k1".to_string(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(cache.get("k1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_scan_pages_until_done() {
        let cache = MemoryKeyValueCache::new();
        for i in 0..5 {
            cache.set(&format!("ns::{}", i), "v").await.unwrap();
        }
        cache.set("other::x", "v").await.unwrap();

        let mut cursor = ScanCursor::Start;
        let mut seen = Vec::new();
        let mut pages = 0;
        while cursor != ScanCursor::Done {
            let page = cache.scan(&cursor, "ns::*", 2).await.unwrap();
            seen.extend(page.keys);
            cursor = page.cursor;
            pages += 1;
        }

        assert_eq!(seen, vec!["ns::0", "ns::1", "ns::2", "ns::3", "ns::4"]);
        assert!(pages >= 3);
    }

    #[tokio::test]
    async fn test_scan_survives_deletes_between_pages() {
        let cache = MemoryKeyValueCache::new();
        for i in 0..6 {
            cache.set(&format!("k{}", i), "v").await.unwrap();
        }

        let mut cursor = ScanCursor::Start;
        let mut deleted = 0;
        while cursor != ScanCursor::Done {
            let page = cache.scan(&cursor, "*", 2).await.unwrap();
            deleted += cache.delete(&page.keys).await.unwrap();
            cursor = page.cursor;
        }

        assert_eq!(deleted, 6);
        assert!(cache.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_scan_empty_cache() {
        let cache = MemoryKeyValueCache::new();
        let page = cache.scan(&ScanCursor::Start, "*", 10).await.unwrap();
        assert!(page.keys.is_empty());
        assert_eq!(page.cursor, ScanCursor::Done);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let cache = MemoryKeyValueCache::new();
        cache.set_available(false);

        assert!(matches!(
            cache.get("k").await,
            Err(CacheError::Connection(_))
        ));
        assert!(cache.set("k", "v").await.is_err());
        assert!(cache.scan(&ScanCursor::Start, "*", 1).await.is_err());

        cache.set_available(true);
        assert_eq!(cache.get("k").await.unwrap(), None);
    }
}
