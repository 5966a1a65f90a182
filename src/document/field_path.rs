//! Dotted field paths addressing values inside the document.

use std::fmt;

use thiserror::Error;

/// Errors that can occur when parsing a dotted key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldPathError {
    /// The key was empty (or only whitespace).
    #[error("key is empty")]
    Empty,

    /// The key contained an empty segment, e.g. `a..b` or `.a`.
    #[error("key '{0}' contains an empty path segment")]
    EmptySegment(String),
}

/// An ordered, non-empty sequence of non-empty path segments.
///
/// Segment 0 names a top-level field of the document; later segments address
/// nested mappings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a user-supplied dotted key such as `svc.region`.
    pub fn parse(key: &str) -> Result<Self, FieldPathError> {
        if key.trim().is_empty() {
            return Err(FieldPathError::Empty);
        }

        let segments: Vec<String> = key.split('.').map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(FieldPathError::EmptySegment(key.to_string()));
        }

        Ok(Self { segments })
    }

    /// A single-segment path naming a top-level field literally.
    ///
    /// Unlike [`FieldPath::parse`], dots in `field` are kept inside the segment.
    pub fn top_level(field: impl Into<String>) -> Self {
        Self {
            segments: vec![field.into()],
        }
    }

    /// The path extended by one more segment.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// All segments, in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The top-level field this path starts at.
    pub fn field(&self) -> &str {
        &self.segments[0]
    }

    /// The segments after the top-level field.
    pub fn nested(&self) -> &[String] {
        &self.segments[1..]
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}
