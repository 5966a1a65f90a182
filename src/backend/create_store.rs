//! Durable store creation utilities.
//!
//! This module parses store URLs and builds the matching [`DurableStore`].

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::config::StoreConfig;

use super::document_store::{DEFAULT_DOCUMENT_KEY, DocumentStore};
use super::durable_store::DurableStore;
use super::fs_store::FsObjectStore;
use super::memory_store::MemoryObjectStore;
use super::s3_store::{S3ObjectStore, S3ObjectStoreConfig};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during store creation.
#[derive(Debug, Error)]
pub enum CreateStoreError {
    /// The store URL is invalid.
    #[error("invalid store url: {0}")]
    InvalidStoreUrl(String),

    /// The URL scheme is not supported.
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
}

/// Result type for store creation.
pub type Result<T> = std::result::Result<T, CreateStoreError>;

// =============================================================================
// Parsed Store Specification
// =============================================================================

/// The type of object store indicated by a store URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreType {
    /// S3-compatible storage (s3:// URL).
    S3,
    /// Local filesystem (file:// URL).
    FileSystem,
    /// Process-local memory (memory:// URL).
    Memory,
}

/// A parsed store URL.
#[derive(Debug, Clone)]
pub struct ParsedStoreSpec {
    /// The type of object store.
    pub store_type: StoreType,

    /// For S3: the bucket name. For filesystem: the directory. Empty for memory.
    pub location: String,

    /// The object key holding the document.
    pub key: String,

    /// Optional endpoint URL (S3 only).
    pub endpoint_url: Option<String>,

    /// Optional region (S3 only).
    pub region: Option<String>,
}

impl ParsedStoreSpec {
    /// Parse a store URL.
    ///
    /// Accepts:
    /// - `s3://bucket/object-key?endpoint_url=...&region=...`
    /// - `file:///path/to/service_data.json`
    /// - `memory://` or `memory://object-key`
    pub fn parse(url: &str) -> Result<Self> {
        if let Some(rest) = url.strip_prefix("s3://") {
            return Self::parse_s3_url(rest);
        }
        if let Some(rest) = url.strip_prefix("file://") {
            return Self::parse_file_url(rest);
        }
        if let Some(rest) = url.strip_prefix("memory://") {
            return Ok(Self {
                store_type: StoreType::Memory,
                location: String::new(),
                key: if rest.is_empty() {
                    DEFAULT_DOCUMENT_KEY.to_string()
                } else {
                    rest.to_string()
                },
                endpoint_url: None,
                region: None,
            });
        }

        match url.find("://") {
            Some(idx) => Err(CreateStoreError::UnsupportedScheme(url[..idx].to_string())),
            None => Err(CreateStoreError::InvalidStoreUrl(format!(
                "'{}' is not a URL",
                url
            ))),
        }
    }

    fn parse_s3_url(without_scheme: &str) -> Result<Self> {
        let (path_part, query_part) = match without_scheme.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (without_scheme, None),
        };

        let (bucket, key) = match path_part.split_once('/') {
            Some((bucket, key)) if !key.is_empty() => (bucket, key),
            Some((bucket, _)) => (bucket, DEFAULT_DOCUMENT_KEY),
            None => (path_part, DEFAULT_DOCUMENT_KEY),
        };

        if bucket.is_empty() {
            return Err(CreateStoreError::InvalidStoreUrl(
                "S3 URL must include bucket name".to_string(),
            ));
        }

        let params = parse_query_string(query_part.unwrap_or(""));

        Ok(Self {
            store_type: StoreType::S3,
            location: bucket.to_string(),
            key: key.to_string(),
            endpoint_url: params.get("endpoint_url").cloned(),
            region: params.get("region").cloned(),
        })
    }

    fn parse_file_url(path: &str) -> Result<Self> {
        if path.is_empty() || path.ends_with('/') {
            return Err(CreateStoreError::InvalidStoreUrl(
                "file:// URL must name the document file".to_string(),
            ));
        }

        let path = Path::new(path);
        let key = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                CreateStoreError::InvalidStoreUrl(format!(
                    "'{}' does not name a file",
                    path.display()
                ))
            })?;
        let location = path
            .parent()
            .map(|dir| dir.to_string_lossy().into_owned())
            .filter(|dir| !dir.is_empty())
            .unwrap_or_else(|| ".".to_string());

        Ok(Self {
            store_type: StoreType::FileSystem,
            location,
            key,
            endpoint_url: None,
            region: None,
        })
    }
}

/// Parse a simple query string into key-value pairs.
fn parse_query_string(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
        })
        .collect()
}

// =============================================================================
// Store Creation
// =============================================================================

/// Create the durable store described by the store configuration.
///
/// Endpoint and region settings in the config take precedence over the
/// URL's query parameters.
pub async fn create_durable_store(config: &StoreConfig) -> Result<Arc<dyn DurableStore>> {
    let spec = ParsedStoreSpec::parse(&config.url)?;

    let store: Arc<dyn DurableStore> = match spec.store_type {
        StoreType::S3 => {
            let mut s3_config = S3ObjectStoreConfig::new(spec.location);
            if let Some(endpoint_url) = config.endpoint_url.clone().or(spec.endpoint_url) {
                s3_config = s3_config.with_endpoint_url(endpoint_url);
            }
            if let Some(region) = config.region.clone().or(spec.region) {
                s3_config = s3_config.with_region(region);
            }
            let objects = Arc::new(S3ObjectStore::new(s3_config).await);
            Arc::new(DocumentStore::new(objects, spec.key))
        }
        StoreType::FileSystem => {
            let objects = Arc::new(FsObjectStore::new(&spec.location));
            Arc::new(DocumentStore::new(objects, spec.key))
        }
        StoreType::Memory => {
            let objects = Arc::new(MemoryObjectStore::new());
            Arc::new(DocumentStore::new(objects, spec.key))
        }
    };

    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_s3_url() {
        let spec = ParsedStoreSpec::parse("s3://my-local-bucket/service_data.json").unwrap();
        assert_eq!(spec.store_type, StoreType::S3);
        assert_eq!(spec.location, "my-local-bucket");
        assert_eq!(spec.key, "service_data.json");
        assert_eq!(spec.endpoint_url, None);
    }

    #[test]
    fn test_parse_s3_url_with_params() {
        let spec = ParsedStoreSpec::parse(
            "s3://bucket/data/doc.json?endpoint_url=http://localhost:4566&region=us-east-1",
        )
        .unwrap();
        assert_eq!(spec.location, "bucket");
        assert_eq!(spec.key, "data/doc.json");
        assert_eq!(spec.endpoint_url, Some("http://localhost:4566".to_string()));
        assert_eq!(spec.region, Some("us-east-1".to_string()));
    }

    #[test]
    fn test_parse_s3_url_default_key() {
        let spec = ParsedStoreSpec::parse("s3://bucket").unwrap();
        assert_eq!(spec.key, DEFAULT_DOCUMENT_KEY);
        let spec = ParsedStoreSpec::parse("s3://bucket/").unwrap();
        assert_eq!(spec.key, DEFAULT_DOCUMENT_KEY);
    }

    #[test]
    fn test_parse_s3_url_requires_bucket() {
        assert!(matches!(
            ParsedStoreSpec::parse("s3:///key.json"),
            Err(CreateStoreError::InvalidStoreUrl(_))
        ));
    }

    #[test]
    fn test_parse_file_url() {
        let spec = ParsedStoreSpec::parse("file:///var/lib/svcdata/service_data.json").unwrap();
        assert_eq!(spec.store_type, StoreType::FileSystem);
        assert_eq!(spec.location, "/var/lib/svcdata");
        assert_eq!(spec.key, "service_data.json");
    }

    #[test]
    fn test_parse_relative_file_url() {
        let spec = ParsedStoreSpec::parse("file://doc.json").unwrap();
        assert_eq!(spec.location, ".");
        assert_eq!(spec.key, "doc.json");
    }

    #[test]
    fn test_parse_file_url_requires_file_name() {
        assert!(ParsedStoreSpec::parse("file://").is_err());
        assert!(ParsedStoreSpec::parse("file:///tmp/").is_err());
    }

    #[test]
    fn test_parse_memory_url() {
        let spec = ParsedStoreSpec::parse("memory://").unwrap();
        assert_eq!(spec.store_type, StoreType::Memory);
        assert_eq!(spec.key, DEFAULT_DOCUMENT_KEY);
    }

    #[test]
    fn test_parse_unsupported() {
        assert!(matches!(
            ParsedStoreSpec::parse("gs://bucket/key"),
            Err(CreateStoreError::UnsupportedScheme(s)) if s == "gs"
        ));
        assert!(matches!(
            ParsedStoreSpec::parse("bucket/key"),
            Err(CreateStoreError::InvalidStoreUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_create_file_store() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = StoreConfig {
            url: format!("file://{}/doc.json", temp_dir.path().display()),
            endpoint_url: None,
            region: None,
        };

        let store = create_durable_store(&config).await.unwrap();
        let mut doc = crate::document::Document::new();
        doc.insert("a".to_string(), serde_json::json!(1));
        store.save(&doc).await.unwrap();

        assert!(temp_dir.path().join("doc.json").exists());
        assert_eq!(store.fetch().await.unwrap(), doc);
    }
}
