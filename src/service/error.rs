use thiserror::Error;

use crate::backend::StoreError;
use crate::caches::CacheError;
use crate::document::FieldPathError;

/// Errors returned by [`RecordService`](super::RecordService) operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed: bad JSON, a non-object body or a bad key.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The requested key (or the whole document) does not exist.
    #[error("key \"{0}\" not found in data")]
    NotFound(String),

    /// The existing document could not be read, so no write was attempted.
    #[error("failed to fetch existing data: {0}")]
    WriteAborted(StoreError),

    /// The durable store failed while reading or writing.
    #[error("store unavailable: {0}")]
    StoreUnavailable(StoreError),

    /// The cache could not be cleared.
    #[error("failed to clear cache: {0}")]
    FlushFailed(#[from] CacheError),
}

impl ServiceError {
    /// The HTTP-style status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::InvalidInput(_) => 400,
            ServiceError::NotFound(_) => 404,
            ServiceError::WriteAborted(_)
            | ServiceError::StoreUnavailable(_)
            | ServiceError::FlushFailed(_) => 500,
        }
    }

    /// The underlying failure, for forwarding as diagnostic details.
    pub fn details(&self) -> Option<String> {
        match self {
            ServiceError::WriteAborted(e) | ServiceError::StoreUnavailable(e) => {
                Some(e.to_string())
            }
            ServiceError::FlushFailed(e) => Some(e.to_string()),
            ServiceError::InvalidInput(_) | ServiceError::NotFound(_) => None,
        }
    }
}

impl From<FieldPathError> for ServiceError {
    fn from(e: FieldPathError) -> Self {
        ServiceError::InvalidInput(e.to_string())
    }
}

/// Result type for record service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
