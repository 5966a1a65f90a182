use async_trait::async_trait;

use crate::document::Document;

/// Error type for durable store operations.
#[derive(Debug)]
pub enum StoreError {
    /// The document does not exist.
    NotFound,
    /// The store could not be reached, or refused the request.
    Unavailable(String),
    /// The stored object exists but is not a JSON mapping.
    InvalidDocument(String),
    /// An I/O error occurred.
    Io(std::io::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "not found"),
            StoreError::Unavailable(msg) => write!(f, "store unavailable: {}", msg),
            StoreError::InvalidDocument(msg) => write!(f, "invalid document: {}", msg),
            StoreError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// The outcome of asking whether the document exists.
#[derive(Debug)]
pub enum Existence {
    /// The document exists.
    Exists,
    /// The document definitely does not exist.
    Absent,
    /// The store could not answer. Callers should go on to fetch and let
    /// the fetch report the failure, rather than assume absence.
    Unknown(StoreError),
}

/// Durable storage for the single service data document.
///
/// Every operation addresses the same well-known identity. Writes always
/// replace the whole document.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Check whether the document exists.
    async fn exists(&self) -> Existence;

    /// Read the document.
    ///
    /// Returns `StoreError::NotFound` if it does not exist.
    async fn fetch(&self) -> Result<Document>;

    /// Overwrite the document.
    async fn save(&self, doc: &Document) -> Result<()>;

    /// Human-readable location of the document, for logging.
    fn location(&self) -> String;
}
