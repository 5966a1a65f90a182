//! The service data document and the pure functions over it.
//!
//! Nothing in this module touches a store or a cache: field paths, cache key
//! naming, path resolution and flattening are all deterministic functions of
//! their inputs.

mod field_path;
mod flatten;
mod key_naming;
mod path_resolver;

use serde_json::{Map, Value};

pub use field_path::{FieldPath, FieldPathError};
pub use flatten::{CacheEntry, document_entries, field_entries, stale_keys};
pub use key_naming::{
    CACHE_NAMESPACE, cache_key, cache_key_pattern, descendant_pattern, key_prefix_pattern,
};
pub use path_resolver::{resolve, resolve_in_document};

/// The single durable record: field name to arbitrarily nested JSON value.
pub type Document = Map<String, Value>;
