//! Configuration types for svcdata-rs.
//!
//! This module defines the structures used to represent application configuration
//! as parsed from an INI-format config file.

use std::fmt;
use std::str::FromStr;

// =============================================================================
// Config Sections
// =============================================================================

/// [store] section - where the durable document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Store URL: `s3://bucket/key.json`, `file:///dir/key.json` or `memory://key.json`.
    pub url: String,
    pub endpoint_url: Option<String>,
    pub region: Option<String>,
}

/// [cache] section - the ephemeral key-value cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Redis URL, or `memory://` for an in-process cache.
    pub url: String,
    /// Disable caching entirely.
    pub no_cache: bool,
    /// Keys examined per SCAN round-trip.
    pub scan_page_size: usize,
    /// Bound on establishing a Redis connection, in milliseconds.
    pub connect_timeout_ms: u64,
    /// Bound on a single Redis command, in milliseconds.
    pub response_timeout_ms: u64,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(format!(
                "unknown log format '{}' (expected pretty, compact or json)",
                other
            )),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Compact => write!(f, "compact"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// [log] section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    /// `EnvFilter` directives, used when `RUST_LOG` is not set.
    pub filter: String,
}

// =============================================================================
// Root Config
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store: StoreConfig,
    pub cache: CacheConfig,
    pub log: LogConfig,
}
