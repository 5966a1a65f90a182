use std::future::Future;

use super::durable_store::Result;

/// A keyed blob store such as an S3 bucket or a local directory.
///
/// [`DocumentStore`](super::DocumentStore) adapts one key of an object store
/// into a [`DurableStore`](super::DurableStore).
///
/// All operations are asynchronous.
pub trait ObjectStore: Send + Sync {
    /// Check if an object exists at the given key.
    ///
    /// A missing object is `Ok(false)`, never an error.
    fn object_exists(&self, key: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Read the contents of the object at the given key.
    ///
    /// Returns `StoreError::NotFound` if the object does not exist.
    fn read_object(&self, key: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Write the object at the given key, replacing any previous contents.
    fn write_object(&self, key: &str, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Describe where `key` lives, e.g. `s3://bucket/key`.
    fn location(&self, key: &str) -> String;
}
