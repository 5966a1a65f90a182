//! Top-level application component.
//!
//! The [`App`] owns the configuration and is the root for building the
//! record service and its collaborators.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::backend::{CreateStoreError, create_durable_store};
use crate::caches::{
    CacheTier, KeyValueCache, MemoryKeyValueCache, NoopKeyValueCache, RedisKeyValueCache,
};
use crate::config::{Config, ConfigSource, read_config};
use crate::handler::Handler;
use crate::service::RecordService;

const MEMORY_CACHE_SCHEME: &str = "memory://";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during App operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Durable store creation error.
    #[error("failed to create store: {0}")]
    CreateStore(#[from] CreateStoreError),
}

/// Result type for App operations.
pub type Result<T> = std::result::Result<T, AppError>;

// =============================================================================
// Context Types
// =============================================================================

/// Context for creating an App.
#[derive(Default)]
pub struct AppContext {
    /// Source for configuration files.
    pub config_source: ConfigSource,
}

// =============================================================================
// App
// =============================================================================

/// The top-level application component.
pub struct App {
    config: Config,
    warnings: Vec<String>,
}

impl App {
    /// Create a new App with the given context.
    pub fn new(ctx: AppContext) -> Result<Self> {
        let config_result =
            read_config(&ctx.config_source).map_err(|e| AppError::Config(e.to_string()))?;

        Ok(Self {
            config: config_result.config,
            warnings: config_result.warnings,
        })
    }

    /// Create an App from an already-built configuration.
    pub fn from_config(config: Config) -> Self {
        Self {
            config,
            warnings: Vec::new(),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Warnings produced while reading the configuration.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Build the cache tier described by the `[cache]` section.
    ///
    /// An unreachable cache is not fatal: the service runs uncached and every
    /// read falls through to the durable store.
    pub async fn create_cache_tier(&self) -> CacheTier {
        let cache = &self.config.cache;
        let kv: Arc<dyn KeyValueCache> = if cache.no_cache {
            info!("caching disabled");
            Arc::new(NoopKeyValueCache)
        } else if cache.url.starts_with(MEMORY_CACHE_SCHEME) {
            Arc::new(MemoryKeyValueCache::new())
        } else {
            let connected = RedisKeyValueCache::connect(
                &cache.url,
                Duration::from_millis(cache.connect_timeout_ms),
                Duration::from_millis(cache.response_timeout_ms),
            )
            .await;
            match connected {
                Ok(redis) => Arc::new(redis),
                Err(e) => {
                    warn!(url = %cache.url, error = %e, "cache unavailable, continuing without it");
                    Arc::new(NoopKeyValueCache)
                }
            }
        };
        CacheTier::new(kv, cache.scan_page_size)
    }

    /// Build the record service over the configured store and cache.
    pub async fn create_record_service(&self) -> Result<Arc<RecordService>> {
        let store = create_durable_store(&self.config.store).await?;
        info!(location = %store.location(), "using durable store");
        let cache = self.create_cache_tier().await;
        Ok(Arc::new(RecordService::new(store, cache)))
    }

    /// Build a handler over a new record service.
    pub async fn create_handler(&self) -> Result<Handler> {
        Ok(Handler::new(self.create_record_service().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_app(no_cache: bool) -> App {
        let ctx = AppContext {
            config_source: ConfigSource {
                overrides: vec![
                    ("store.url".to_string(), "memory://doc.json".to_string()),
                    ("cache.url".to_string(), "memory://".to_string()),
                    ("cache.no_cache".to_string(), no_cache.to_string()),
                ],
                ..Default::default()
            },
        };
        App::new(ctx).unwrap()
    }

    #[tokio::test]
    async fn test_app_creation() {
        let app = memory_app(false);
        assert_eq!(app.config().store.url, "memory://doc.json");
        assert!(!app.config().cache.no_cache);
    }

    #[tokio::test]
    async fn test_create_handler_memory() {
        let handler = memory_app(false).create_handler().await.unwrap();

        assert_eq!(handler.add(Some(r#"{"a":{"b":1}}"#)).await.status, 201);
        assert_eq!(handler.read(Some("a.b")).await.status, 200);
        assert_eq!(handler.clear_cache().await.body["cleared"], 2);
    }

    #[tokio::test]
    async fn test_no_cache_uses_noop() {
        let handler = memory_app(true).create_handler().await.unwrap();

        assert_eq!(handler.add(Some(r#"{"a":1}"#)).await.status, 201);
        assert_eq!(handler.clear_cache().await.body["cleared"], 0);
        assert_eq!(handler.read(Some("a")).await.status, 200);
    }

    #[tokio::test]
    async fn test_silent_cache_falls_back_to_noop() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let ctx = AppContext {
            config_source: ConfigSource {
                overrides: vec![
                    ("store.url".to_string(), "memory://doc.json".to_string()),
                    ("cache.url".to_string(), format!("redis://{}", addr)),
                    ("cache.connect_timeout_ms".to_string(), "200".to_string()),
                    ("cache.response_timeout_ms".to_string(), "200".to_string()),
                ],
                ..Default::default()
            },
        };
        let app = App::new(ctx).unwrap();

        let handler = tokio::time::timeout(Duration::from_secs(10), app.create_handler())
            .await
            .expect("cache connect was not bounded")
            .unwrap();

        assert_eq!(handler.add(Some(r#"{"a":1}"#)).await.status, 201);
        assert_eq!(handler.read(Some("a")).await.status, 200);
        assert_eq!(handler.clear_cache().await.body["cleared"], 0);
    }

    #[tokio::test]
    async fn test_invalid_store_url() {
        let mut config = memory_app(false).config().clone();
        config.store.url = "ftp://nowhere/doc.json".to_string();

        let result = App::from_config(config).create_record_service().await;
        assert!(matches!(result, Err(AppError::CreateStore(_))));
    }

    #[test]
    fn test_bad_override_is_config_error() {
        let ctx = AppContext {
            config_source: ConfigSource {
                overrides: vec![("nope".to_string(), "x".to_string())],
                ..Default::default()
            },
        };
        assert!(matches!(App::new(ctx), Err(AppError::Config(_))));
    }
}
