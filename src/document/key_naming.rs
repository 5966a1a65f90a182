//! Mapping from field paths to cache keys.
//!
//! Every cache key is `service_data::` followed by the path segments joined
//! with `.`. A `.` or `\` inside a segment is escaped with a backslash so that
//! two distinct paths can never map to the same key.

use super::FieldPath;

/// Namespace token prefixed to every cache key.
pub const CACHE_NAMESPACE: &str = "service_data::";

/// Derive the cache key for a field path.
pub fn cache_key(path: &FieldPath) -> String {
    let mut key = String::from(CACHE_NAMESPACE);
    for (i, segment) in path.segments().iter().enumerate() {
        if i > 0 {
            key.push('.');
        }
        push_escaped_segment(&mut key, segment);
    }
    key
}

/// Glob pattern matching every key in the namespace.
pub fn cache_key_pattern() -> String {
    format!("{}*", CACHE_NAMESPACE)
}

/// Glob pattern matching every key strictly beneath `path`.
///
/// The key of `path` itself is not matched.
pub fn descendant_pattern(path: &FieldPath) -> String {
    starts_with_pattern(&format!("{}.", cache_key(path)))
}

/// Glob pattern matching every namespaced key whose text after the
/// namespace starts with `prefix`.
pub fn key_prefix_pattern(prefix: &str) -> String {
    starts_with_pattern(&format!("{}{}", CACHE_NAMESPACE, prefix))
}

fn starts_with_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('*');
    pattern
}

fn push_escaped_segment(key: &mut String, segment: &str) {
    for c in segment.chars() {
        if c == '.' || c == '\\' {
            key.push('\\');
        }
        key.push(c);
    }
}
