//! Path-based lookup inside JSON values.

use serde_json::Value;

use super::{Document, FieldPath};

/// Walk `path` from `root`, returning the value it addresses.
///
/// Only mappings are descended into. A missing key, a scalar or a sequence
/// anywhere along the way yields `None`.
pub fn resolve<'a>(root: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(root, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        _ => None,
    })
}

/// Resolve a full field path starting at the document root.
pub fn resolve_in_document<'a>(doc: &'a Document, path: &FieldPath) -> Option<&'a Value> {
    doc.get(path.field())
        .and_then(|value| resolve(value, path.nested()))
}
