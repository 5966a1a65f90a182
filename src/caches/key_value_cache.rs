//! Key-value cache trait and types.
//!
//! This module defines the string key-value interface the cache tier runs on.

use async_trait::async_trait;
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during key-value cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache could not be reached.
    #[error("cache connection error: {0}")]
    Connection(String),

    /// The cache rejected or failed a command.
    #[error("cache command error: {0}")]
    Command(String),

    /// A stored value could not be decoded.
    #[error("cache encoding error: {0}")]
    Encoding(String),
}

/// Result type for key-value cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

// =============================================================================
// Scanning
// =============================================================================

/// Position of a key enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanCursor {
    /// Begin a new enumeration.
    Start,
    /// Resume from an opaque, implementation-defined position.
    Continue(String),
    /// The enumeration is complete.
    Done,
}

/// One page of a key enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPage {
    /// Keys matched in this page. May be empty even when more pages follow.
    pub keys: Vec<String>,
    /// Where to resume, or [`ScanCursor::Done`].
    pub cursor: ScanCursor,
}

// =============================================================================
// KeyValueCache Trait
// =============================================================================

/// A string key-value cache interface.
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    /// Set `key` to `value`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Get the value for a key, returning `None` if not present.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Delete keys, returning how many existed. Missing keys are not an error.
    async fn delete(&self, keys: &[String]) -> Result<usize>;

    /// Fetch one page of keys matching the glob `pattern`.
    ///
    /// `count` is a hint for how much work to do per round-trip; a page may
    /// hold fewer or more keys.
    async fn scan(&self, cursor: &ScanCursor, pattern: &str, count: usize) -> Result<ScanPage>;
}

// =============================================================================
// NoopKeyValueCache
// =============================================================================

/// A no-op cache implementation that never caches anything.
///
/// All reads return cache misses, all writes silently succeed without storing.
/// Use this when caching is disabled via configuration.
pub struct NoopKeyValueCache;

#[async_trait]
impl KeyValueCache for NoopKeyValueCache {
    async fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn delete(&self, _keys: &[String]) -> Result<usize> {
        Ok(0)
    }

    async fn scan(&self, _cursor: &ScanCursor, _pattern: &str, _count: usize) -> Result<ScanPage> {
        Ok(ScanPage {
            keys: Vec::new(),
            cursor: ScanCursor::Done,
        })
    }
}
