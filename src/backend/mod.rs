//! Durable storage for the service data document.
//!
//! [`ObjectStore`] implementations (S3, local filesystem, memory) store keyed
//! blobs. [`DocumentStore`] adapts one key of an object store into the
//! [`DurableStore`] contract used by the record service.

mod create_store;
mod document_store;
mod durable_store;
mod fs_store;
mod memory_store;
mod object_store;
mod s3_store;

pub use create_store::{
    CreateStoreError, ParsedStoreSpec, StoreType, create_durable_store,
};
pub use document_store::{DEFAULT_DOCUMENT_KEY, DocumentStore};
pub use durable_store::{DurableStore, Existence, Result, StoreError};
pub use fs_store::FsObjectStore;
pub use memory_store::MemoryObjectStore;
pub use object_store::ObjectStore;
pub use s3_store::{S3ObjectStore, S3ObjectStoreConfig};
