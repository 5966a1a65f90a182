//! Cache layer for the service data document.
//!
//! ## Architecture
//!
//! 1. **KeyValueCache** - Low-level string key-value interface
//!    - [`RedisKeyValueCache`] - Redis-backed implementation
//!    - [`MemoryKeyValueCache`] - In-process implementation, used by tests
//!    - [`NoopKeyValueCache`] - Never stores anything (caching disabled)
//!
//! 2. **CacheTier** - Best-effort JSON access used by the record service
//!    - Read failures degrade to misses
//!    - Write failures are logged and swallowed
//!    - Paged, cursor-driven flush

mod cache_tier;
mod key_value_cache;
mod memory_cache;
mod redis_cache;

pub use cache_tier::{CacheTier, DEFAULT_SCAN_PAGE_SIZE};
pub use key_value_cache::{
    CacheError, KeyValueCache, NoopKeyValueCache, Result, ScanCursor, ScanPage,
};
pub use memory_cache::MemoryKeyValueCache;
pub use redis_cache::{
    DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_REDIS_URL, DEFAULT_RESPONSE_TIMEOUT_MS, RedisKeyValueCache,
};
