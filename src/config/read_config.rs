//! Configuration file reading and parsing.
//!
//! This module handles locating, reading, and parsing INI-format configuration files,
//! with support for layered overrides.

use std::env;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use configparser::ini::Ini;
use thiserror::Error;

use crate::caches::{
    DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_REDIS_URL, DEFAULT_RESPONSE_TIMEOUT_MS,
    DEFAULT_SCAN_PAGE_SIZE,
};

use super::{CacheConfig, Config, LogConfig, LogFormat, StoreConfig};

// =============================================================================
// Constants - Default Values
// =============================================================================

const DEFAULT_STORE_URL: &str = "s3://my-local-bucket/service_data.json";
const DEFAULT_CACHE_NO_CACHE: bool = false;
const DEFAULT_LOG_FILTER: &str = "warn,svcdata_rs=info";

const ENV_CONFIG_FILE: &str = "SVCDATA_CONFIG_FILE";
const DEFAULT_CONFIG_FILENAME: &str = ".svcdataconfig";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid integer '{value}' for key '{key}': {source}")]
    InvalidInteger {
        key: String,
        value: String,
        source: ParseIntError,
    },

    #[error("invalid boolean '{value}' for key '{key}'")]
    InvalidBoolean { key: String, value: String },

    #[error("invalid value '{value}' for key '{key}': {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },

    #[error("invalid override key '{key}': {message}")]
    InvalidOverrideKey { key: String, message: String },
}

/// Result type for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

// =============================================================================
// ConfigSource
// =============================================================================

/// Specifies how to locate and layer configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigSource {
    /// Explicit config file path from CLI. If specified and doesn't exist, error.
    /// If None, fall back to SVCDATA_CONFIG_FILE env var, then ~/.svcdataconfig.
    pub config_file: Option<PathBuf>,

    /// Additional override config file (layered on top of base config).
    pub override_file: Option<PathBuf>,

    /// Individual key=value overrides (applied last).
    /// Keys use dot-notation: "store.url", "cache.no_cache"
    pub overrides: Vec<(String, String)>,
}

// =============================================================================
// Value Parsing
// =============================================================================

fn parse_bool_value(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidBoolean {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn parse_positive_value<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr<Err = ParseIntError> + Default + PartialEq,
{
    let parsed: T = value
        .trim()
        .parse()
        .map_err(|e| ConfigError::InvalidInteger {
            key: key.to_string(),
            value: value.to_string(),
            source: e,
        })?;
    if parsed == T::default() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            message: "must be at least 1".to_string(),
        });
    }
    Ok(parsed)
}

fn parse_log_format_value(key: &str, value: &str) -> Result<LogFormat> {
    value.parse().map_err(|message| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        message,
    })
}

// =============================================================================
// Config File Resolution
// =============================================================================

/// Information about how the config file was resolved.
#[derive(Debug)]
pub struct ResolvedConfigFile {
    /// The path to the config file, if one was found.
    pub path: Option<PathBuf>,
    /// Warning message if env var pointed to nonexistent file.
    pub warning: Option<String>,
}

/// Resolve which config file to use based on the ConfigSource and environment.
fn resolve_config_file(source: &ConfigSource) -> Result<ResolvedConfigFile> {
    resolve_config_file_from(source, env::var(ENV_CONFIG_FILE).ok(), home_dir())
}

fn resolve_config_file_from(
    source: &ConfigSource,
    env_path: Option<String>,
    home: Option<PathBuf>,
) -> Result<ResolvedConfigFile> {
    // If explicit path provided, it must exist
    if let Some(ref path) = source.config_file {
        if path.exists() {
            return Ok(ResolvedConfigFile {
                path: Some(path.clone()),
                warning: None,
            });
        } else {
            return Err(ConfigError::FileNotFound(path.clone()));
        }
    }

    if let Some(env_path) = env_path {
        let path = PathBuf::from(&env_path);
        if path.exists() {
            return Ok(ResolvedConfigFile {
                path: Some(path),
                warning: None,
            });
        } else {
            // Warn but continue with defaults
            return Ok(ResolvedConfigFile {
                path: None,
                warning: Some(format!(
                    "config file specified by {} does not exist: {}",
                    ENV_CONFIG_FILE, env_path
                )),
            });
        }
    }

    if let Some(home) = home {
        let default_path = home.join(DEFAULT_CONFIG_FILENAME);
        if default_path.exists() {
            return Ok(ResolvedConfigFile {
                path: Some(default_path),
                warning: None,
            });
        }
    }

    Ok(ResolvedConfigFile {
        path: None,
        warning: None,
    })
}

/// Get the user's home directory.
fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME").map(PathBuf::from)
}

// =============================================================================
// Default Config
// =============================================================================

/// Create a Config with all default values.
fn default_config() -> Config {
    Config {
        store: StoreConfig {
            url: DEFAULT_STORE_URL.to_string(),
            endpoint_url: None,
            region: None,
        },
        cache: CacheConfig {
            url: DEFAULT_REDIS_URL.to_string(),
            no_cache: DEFAULT_CACHE_NO_CACHE,
            scan_page_size: DEFAULT_SCAN_PAGE_SIZE,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            response_timeout_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
        },
        log: LogConfig {
            format: LogFormat::Pretty,
            filter: DEFAULT_LOG_FILTER.to_string(),
        },
    }
}

// =============================================================================
// INI Parsing
// =============================================================================

/// Apply an INI file's contents to a Config, layering on top of existing values.
fn apply_ini_to_config(config: &mut Config, ini: &Ini) -> Result<()> {
    // [store] section
    if let Some(url) = ini.get("store", "url") {
        config.store.url = url;
    }
    if let Some(endpoint_url) = ini.get("store", "endpoint_url") {
        config.store.endpoint_url = Some(endpoint_url);
    }
    if let Some(region) = ini.get("store", "region") {
        config.store.region = Some(region);
    }

    // [cache] section
    if let Some(url) = ini.get("cache", "url") {
        config.cache.url = url;
    }
    if let Some(no_cache) = ini.get("cache", "no-cache") {
        config.cache.no_cache = parse_bool_value("cache.no-cache", &no_cache)?;
    }
    if let Some(size) = ini.get("cache", "scan_page_size") {
        config.cache.scan_page_size = parse_positive_value("cache.scan_page_size", &size)?;
    }
    if let Some(ms) = ini.get("cache", "connect_timeout_ms") {
        config.cache.connect_timeout_ms = parse_positive_value("cache.connect_timeout_ms", &ms)?;
    }
    if let Some(ms) = ini.get("cache", "response_timeout_ms") {
        config.cache.response_timeout_ms =
            parse_positive_value("cache.response_timeout_ms", &ms)?;
    }

    // [log] section
    if let Some(format) = ini.get("log", "format") {
        config.log.format = parse_log_format_value("log.format", &format)?;
    }
    if let Some(filter) = ini.get("log", "filter") {
        config.log.filter = filter;
    }

    Ok(())
}

/// Load and parse an INI file.
fn load_ini(path: &Path) -> Result<Ini> {
    let mut ini = Ini::new();
    ini.load(path).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e,
    })?;
    Ok(ini)
}

// =============================================================================
// Override Application
// =============================================================================

/// Apply a single key=value override to the config.
fn apply_override(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let parts: Vec<&str> = key.splitn(2, '.').collect();

    match parts.as_slice() {
        // store.url, store.endpoint_url, store.region
        ["store", param] => apply_store_override(config, param, value),

        // cache.url, cache.no_cache, cache.scan_page_size, cache.*_timeout_ms
        ["cache", param] => apply_cache_override(config, param, value),

        // log.format, log.filter
        ["log", param] => apply_log_override(config, param, value),

        _ => Err(ConfigError::InvalidOverrideKey {
            key: key.to_string(),
            message: "unrecognized key format".to_string(),
        }),
    }
}

fn apply_store_override(config: &mut Config, param: &str, value: &str) -> Result<()> {
    match param {
        "url" => {
            config.store.url = value.to_string();
            Ok(())
        }
        "endpoint_url" => {
            config.store.endpoint_url = Some(value.to_string());
            Ok(())
        }
        "region" => {
            config.store.region = Some(value.to_string());
            Ok(())
        }
        _ => Err(ConfigError::InvalidOverrideKey {
            key: format!("store.{}", param),
            message: "unknown parameter".to_string(),
        }),
    }
}

fn apply_cache_override(config: &mut Config, param: &str, value: &str) -> Result<()> {
    match param {
        "url" => {
            config.cache.url = value.to_string();
            Ok(())
        }
        "no_cache" | "no-cache" => {
            config.cache.no_cache = parse_bool_value("cache.no_cache", value)?;
            Ok(())
        }
        "scan_page_size" => {
            config.cache.scan_page_size = parse_positive_value("cache.scan_page_size", value)?;
            Ok(())
        }
        "connect_timeout_ms" => {
            config.cache.connect_timeout_ms =
                parse_positive_value("cache.connect_timeout_ms", value)?;
            Ok(())
        }
        "response_timeout_ms" => {
            config.cache.response_timeout_ms =
                parse_positive_value("cache.response_timeout_ms", value)?;
            Ok(())
        }
        _ => Err(ConfigError::InvalidOverrideKey {
            key: format!("cache.{}", param),
            message: "unknown parameter".to_string(),
        }),
    }
}

fn apply_log_override(config: &mut Config, param: &str, value: &str) -> Result<()> {
    match param {
        "format" => {
            config.log.format = parse_log_format_value("log.format", value)?;
            Ok(())
        }
        "filter" => {
            config.log.filter = value.to_string();
            Ok(())
        }
        _ => Err(ConfigError::InvalidOverrideKey {
            key: format!("log.{}", param),
            message: "unknown parameter".to_string(),
        }),
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

/// Result of reading configuration, including any warnings.
#[derive(Debug)]
pub struct ConfigResult {
    /// The parsed configuration.
    pub config: Config,
    /// Any warnings generated during config loading.
    pub warnings: Vec<String>,
}

/// Read and parse configuration from the specified sources.
///
/// Configuration is layered in this order:
/// 1. Built-in defaults
/// 2. Base config file (from CLI, env var, or ~/.svcdataconfig)
/// 3. Override config file (if specified)
/// 4. Individual overrides (applied last)
pub fn read_config(source: &ConfigSource) -> Result<ConfigResult> {
    read_config_with(source, resolve_config_file(source)?)
}

fn read_config_with(source: &ConfigSource, resolved: ResolvedConfigFile) -> Result<ConfigResult> {
    let mut warnings = Vec::new();

    let mut config = default_config();

    if let Some(warning) = resolved.warning {
        warnings.push(warning);
    }
    if let Some(ref path) = resolved.path {
        let ini = load_ini(path)?;
        apply_ini_to_config(&mut config, &ini)?;
    }

    if let Some(ref override_path) = source.override_file {
        if !override_path.exists() {
            return Err(ConfigError::FileNotFound(override_path.clone()));
        }
        let ini = load_ini(override_path)?;
        apply_ini_to_config(&mut config, &ini)?;
    }

    for (key, value) in &source.overrides {
        apply_override(&mut config, key, value)?;
    }

    Ok(ConfigResult { config, warnings })
}

// =============================================================================
// Tests
// =============================================================================
