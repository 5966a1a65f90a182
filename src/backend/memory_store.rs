use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::durable_store::{Result, StoreError};
use super::object_store::ObjectStore;

/// An in-memory implementation of `ObjectStore`, intended primarily for testing.
///
/// Counts every call so tests can tell whether an operation reached the
/// store, and can be told to fail individual kinds of request.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
    exists_calls: AtomicUsize,
    read_calls: AtomicUsize,
    write_calls: AtomicUsize,
    fail_exists: AtomicBool,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `object_exists` calls so far.
    pub fn exists_calls(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
    }

    /// Number of `read_object` calls so far.
    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    /// Number of `write_object` calls so far.
    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    /// Make `object_exists` fail with `StoreError::Unavailable`.
    pub fn set_fail_exists(&self, fail: bool) {
        self.fail_exists.store(fail, Ordering::SeqCst);
    }

    /// Make `read_object` fail with `StoreError::Unavailable`.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make `write_object` fail with `StoreError::Unavailable`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw contents of an object, bypassing counters and failure modes.
    pub fn peek(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.read().unwrap().get(key).cloned()
    }

    fn check(flag: &AtomicBool, op: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable(format!("injected {} failure", op)))
        } else {
            Ok(())
        }
    }
}

impl ObjectStore for MemoryObjectStore {
    async fn object_exists(&self, key: &str) -> Result<bool> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_exists, "exists")?;
        let objects = self.objects.read().unwrap();
        Ok(objects.contains_key(key))
    }

    async fn read_object(&self, key: &str) -> Result<Vec<u8>> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_reads, "read")?;
        let objects = self.objects.read().unwrap();
        objects.get(key).cloned().ok_or(StoreError::NotFound)
    }

    async fn write_object(&self, key: &str, data: &[u8]) -> Result<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_writes, "write")?;
        let mut objects = self.objects.write().unwrap();
        objects.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    fn location(&self, key: &str) -> String {
        format!("memory://{}", key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_object_roundtrip() {
        let store = MemoryObjectStore::new();
        let data = b"hello world";

        assert!(!store.object_exists("doc.json").await.unwrap());

        store.write_object("doc.json", data).await.unwrap();

        assert!(store.object_exists("doc.json").await.unwrap());
        assert_eq!(store.read_object("doc.json").await.unwrap(), data);
        assert_eq!(store.exists_calls(), 2);
        assert_eq!(store.read_calls(), 1);
        assert_eq!(store.write_calls(), 1);
    }

    #[tokio::test]
    async fn test_read_nonexistent_object() {
        let store = MemoryObjectStore::new();
        let result = store.read_object("nonexistent").await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let store = MemoryObjectStore::new();
        store.write_object("doc.json", b"{}").await.unwrap();

        store.set_fail_exists(true);
        store.set_fail_reads(true);
        store.set_fail_writes(true);

        assert!(matches!(
            store.object_exists("doc.json").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.read_object("doc.json").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.write_object("doc.json", b"[]").await,
            Err(StoreError::Unavailable(_))
        ));
        assert_eq!(store.peek("doc.json"), Some(b"{}".to_vec()));
    }
}
