//! svcdata-rs - A single JSON document in durable storage, served through a cache.

pub mod app;
pub mod backend;
pub mod caches;
pub mod cli;
pub mod config;
pub mod document;
pub mod handler;
pub mod service;

pub use document::{Document, FieldPath};
pub use handler::{Handler, Response};
pub use service::{RecordService, ServiceError};
