//! Flattening of document fields into individually addressable cache entries.
//!
//! A field produces one entry for itself and, when its value is a mapping,
//! one entry per nested field, recursively down to the leaves. Sequences are
//! stored whole; their elements get no entries of their own.

use serde_json::Value;

use super::key_naming::cache_key;
use super::{Document, FieldPath};

/// A cache key paired with the compact JSON encoding of its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: String,
    pub value: String,
}

impl CacheEntry {
    fn new(path: &FieldPath, value: &Value) -> Self {
        Self {
            key: cache_key(path),
            value: value.to_string(),
        }
    }
}

/// Entries for the value at `path` and everything nested beneath it.
pub fn field_entries(path: &FieldPath, value: &Value) -> Vec<CacheEntry> {
    let mut entries = Vec::new();
    collect(path, value, &mut entries);
    entries
}

/// Entries for every field of the document.
pub fn document_entries(doc: &Document) -> Vec<CacheEntry> {
    let mut entries = Vec::new();
    for (field, value) in doc {
        collect(&FieldPath::top_level(field.clone()), value, &mut entries);
    }
    entries
}

/// Keys the old value of a field produced that its new value does not.
///
/// These are the entries that would otherwise linger with values that no
/// longer exist in the document.
pub fn stale_keys(path: &FieldPath, old: &Value, new: Option<&Value>) -> Vec<String> {
    let fresh: Vec<String> = match new {
        Some(value) => field_entries(path, value)
            .into_iter()
            .map(|e| e.key)
            .collect(),
        None => Vec::new(),
    };

    field_entries(path, old)
        .into_iter()
        .map(|e| e.key)
        .filter(|key| !fresh.contains(key))
        .collect()
}

fn collect(path: &FieldPath, value: &Value, entries: &mut Vec<CacheEntry>) {
    entries.push(CacheEntry::new(path, value));
    if let Value::Object(map) = value {
        for (field, nested) in map {
            collect(&path.child(field.clone()), nested, entries);
        }
    }
}
