//! The record service: write-through, read-through access to the document.

mod error;
mod record_service;

pub use error::{Result, ServiceError};
pub use record_service::RecordService;
