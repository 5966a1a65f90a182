use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::document::Document;

use super::durable_store::{DurableStore, Existence, Result, StoreError};
use super::object_store::ObjectStore;

/// Default object key holding the service data document.
pub const DEFAULT_DOCUMENT_KEY: &str = "service_data.json";

/// Adapter that implements `DurableStore` on one key of an `ObjectStore`.
///
/// The document is stored as pretty-printed JSON. Only complete documents
/// are ever written.
pub struct DocumentStore<O: ObjectStore> {
    store: Arc<O>,
    key: String,
}

impl<O: ObjectStore> DocumentStore<O> {
    /// Create a new adapter for the object at `key`.
    pub fn new(store: Arc<O>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }
}

/// Decode stored bytes into a document.
fn decode(data: &[u8]) -> Result<Document> {
    match serde_json::from_slice::<Value>(data) {
        Ok(Value::Object(doc)) => Ok(doc),
        Ok(other) => Err(StoreError::InvalidDocument(format!(
            "expected a JSON object, found {}",
            json_kind(&other)
        ))),
        Err(e) => Err(StoreError::InvalidDocument(e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl<O: ObjectStore + 'static> DurableStore for DocumentStore<O> {
    async fn exists(&self) -> Existence {
        match self.store.object_exists(&self.key).await {
            Ok(true) => Existence::Exists,
            Ok(false) => Existence::Absent,
            Err(StoreError::NotFound) => Existence::Absent,
            Err(e) => Existence::Unknown(e),
        }
    }

    async fn fetch(&self) -> Result<Document> {
        let data = self.store.read_object(&self.key).await?;
        decode(&data)
    }

    async fn save(&self, doc: &Document) -> Result<()> {
        let data = serde_json::to_vec_pretty(doc)
            .map_err(|e| StoreError::InvalidDocument(e.to_string()))?;
        self.store.write_object(&self.key, &data).await
    }

    fn location(&self) -> String {
        self.store.location(&self.key)
    }
}
