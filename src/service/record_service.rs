//! Read-through / write-through orchestration over the durable store and cache.
//!
//! The durable store owns the document. The cache holds one entry per field
//! path (see [`crate::document::field_entries`]) and is only ever populated
//! from values that are already durable:
//! - writes merge, persist, then populate;
//! - reads try the cache at the full path, then fall back to the store and
//!   repopulate the top-level field they touched;
//! - deletes evict first, then persist the reduced document.
//!
//! There is no locking around the document. Two concurrent writes both merge
//! against the document they read, and the later save wins.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::backend::{DurableStore, Existence, StoreError};
use crate::caches::CacheTier;
use crate::document::{
    Document, FieldPath, cache_key, cache_key_pattern, descendant_pattern, document_entries,
    field_entries, resolve_in_document, stale_keys,
};

use super::error::{Result, ServiceError};

/// The record service: point writes, point reads, deletes and cache flushes.
pub struct RecordService {
    store: Arc<dyn DurableStore>,
    cache: CacheTier,
}

impl RecordService {
    /// Create a service over a durable store and a cache tier.
    pub fn new(store: Arc<dyn DurableStore>, cache: CacheTier) -> Self {
        Self { store, cache }
    }

    /// The cache tier.
    pub fn cache(&self) -> &CacheTier {
        &self.cache
    }

    // =========================================================================
    // Write
    // =========================================================================

    /// Merge a JSON object body into the document.
    pub async fn add(&self, body: &str) -> Result<()> {
        let incoming = parse_body(body)?;
        self.add_document(incoming).await
    }

    /// Merge `incoming` into the document.
    ///
    /// Top-level fields of `incoming` replace existing ones whole; nested
    /// objects under the same field are not merged.
    pub async fn add_document(&self, incoming: Document) -> Result<()> {
        let existing = self.load_for_write().await?;

        let mut stale = Vec::new();
        for (field, value) in &incoming {
            if let Some(old) = existing.get(field) {
                let path = FieldPath::top_level(field.clone());
                stale.extend(stale_keys(&path, old, Some(value)));
            }
        }

        let mut merged = existing;
        merged.extend(incoming);

        if let Err(e) = self.store.save(&merged).await {
            error!(location = %self.store.location(), error = %e, "failed to save document");
            return Err(ServiceError::StoreUnavailable(e));
        }
        info!(
            location = %self.store.location(),
            fields = merged.len(),
            "saved document"
        );

        self.cache.evict(&stale).await;
        self.cache.set_entries(&document_entries(&merged)).await;
        Ok(())
    }

    /// Load the document a write will merge against.
    ///
    /// Absence means an empty document. Any other failure aborts the write
    /// before anything is modified.
    async fn load_for_write(&self) -> Result<Document> {
        match self.store.exists().await {
            Existence::Absent => return Ok(Document::new()),
            Existence::Exists => {}
            Existence::Unknown(e) => {
                warn!(error = %e, "existence check failed, fetching anyway");
            }
        }

        match self.store.fetch().await {
            Ok(doc) => Ok(doc),
            Err(StoreError::NotFound) => Ok(Document::new()),
            Err(e) => {
                error!(location = %self.store.location(), error = %e, "failed to fetch existing document");
                Err(ServiceError::WriteAborted(e))
            }
        }
    }

    // =========================================================================
    // Read
    // =========================================================================

    /// Read the value at a dotted key such as `svc.port`.
    pub async fn read(&self, key: &str) -> Result<Value> {
        let path = FieldPath::parse(key)?;

        if let Some(value) = self.cache.get(&cache_key(&path)).await {
            return Ok(value);
        }

        let doc = self.load_for_read(key).await?;
        let value = resolve_in_document(&doc, &path)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(key.to_string()))?;

        // Repopulate the whole top-level field so sibling paths hit next time.
        if let Some(field_value) = doc.get(path.field()) {
            let field_path = FieldPath::top_level(path.field());
            self.cache
                .set_entries(&field_entries(&field_path, field_value))
                .await;
        }

        debug!(key, "served read from store");
        Ok(value)
    }

    /// Read the whole document, repopulating the cache for every field.
    ///
    /// An absent document is returned as an empty one.
    pub async fn snapshot(&self) -> Result<Document> {
        let doc = match self.store.exists().await {
            Existence::Absent => return Ok(Document::new()),
            Existence::Exists | Existence::Unknown(_) => match self.store.fetch().await {
                Ok(doc) => doc,
                Err(StoreError::NotFound) => return Ok(Document::new()),
                Err(e) => {
                    error!(location = %self.store.location(), error = %e, "failed to fetch document");
                    return Err(ServiceError::StoreUnavailable(e));
                }
            },
        };

        self.cache.set_entries(&document_entries(&doc)).await;
        Ok(doc)
    }

    /// Fetch the document for a read or delete of `key`.
    ///
    /// An absent document means the key is not found.
    async fn load_for_read(&self, key: &str) -> Result<Document> {
        if let Existence::Absent = self.store.exists().await {
            return Err(ServiceError::NotFound(key.to_string()));
        }

        match self.store.fetch().await {
            Ok(doc) => Ok(doc),
            Err(StoreError::NotFound) => Err(ServiceError::NotFound(key.to_string())),
            Err(e) => {
                error!(location = %self.store.location(), error = %e, "failed to fetch document");
                Err(ServiceError::StoreUnavailable(e))
            }
        }
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Remove a top-level field from the document.
    ///
    /// `key` names the field literally; it is not split on dots.
    pub async fn delete(&self, key: &str) -> Result<()> {
        if key.trim().is_empty() {
            return Err(ServiceError::InvalidInput("key is empty".to_string()));
        }

        let path = FieldPath::top_level(key);
        self.cache.evict(&[cache_key(&path)]).await;
        self.cache.evict_matching(&descendant_pattern(&path)).await;

        let mut doc = self.load_for_read(key).await?;
        if doc.remove(key).is_none() {
            return Err(ServiceError::NotFound(key.to_string()));
        }

        if let Err(e) = self.store.save(&doc).await {
            error!(location = %self.store.location(), error = %e, "failed to save document");
            return Err(ServiceError::StoreUnavailable(e));
        }
        info!(key, remaining = doc.len(), "deleted field");
        Ok(())
    }

    // =========================================================================
    // Flush
    // =========================================================================

    /// Remove every cache entry in the namespace. Returns how many were removed.
    ///
    /// The durable store is not touched.
    pub async fn flush(&self) -> Result<usize> {
        let cleared = self.cache.flush(&cache_key_pattern()).await?;
        info!(cleared, "cleared cache");
        Ok(cleared)
    }
}

/// Parse a request body that must be a JSON object.
fn parse_body(body: &str) -> Result<Document> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(doc)) => Ok(doc),
        Ok(_) => Err(ServiceError::InvalidInput(
            "body must be a JSON object".to_string(),
        )),
        Err(e) => Err(ServiceError::InvalidInput(format!("invalid JSON: {}", e))),
    }
}
