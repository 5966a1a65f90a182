//! Command-line argument definitions and helpers.

use std::path::PathBuf;

use clap::Args;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::app::AppContext;
use crate::config::ConfigSource;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during argument processing.
#[derive(Debug, Error)]
pub enum ArgsError {
    /// I/O error reading or writing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid argument combination.
    #[error("{0}")]
    InvalidArgs(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for argument operations.
pub type Result<T> = std::result::Result<T, ArgsError>;

// =============================================================================
// Global Arguments
// =============================================================================

/// Global arguments that apply to all commands.
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Path to the main configuration file.
    #[arg(long = "config-file", global = true)]
    pub config_file: Option<PathBuf>,

    /// Path to the configuration overrides file.
    #[arg(long = "config-file-overrides", global = true)]
    pub config_file_overrides: Option<PathBuf>,

    /// Configuration overrides in the form name=value.
    #[arg(long = "config", value_parser = parse_config_override, global = true)]
    pub config_overrides: Vec<(String, String)>,

    /// Durable store URL (s3://bucket/key.json, file:///path/key.json, memory://).
    #[arg(long = "store", global = true)]
    pub store: Option<String>,

    /// Cache URL (redis://host:port).
    #[arg(long = "cache-url", global = true)]
    pub cache_url: Option<String>,

    /// Disable caching.
    #[arg(long = "no-cache", global = true)]
    pub no_cache: bool,

    #[command(flatten)]
    pub output: OutputSink,
}

impl GlobalArgs {
    /// Convert to a ConfigSource for reading configuration.
    ///
    /// `--store`, `--cache-url` and `--no-cache` are applied after every
    /// `--config` override.
    pub fn to_config_source(&self) -> ConfigSource {
        let mut overrides = self.config_overrides.clone();
        if let Some(ref store) = self.store {
            overrides.push(("store.url".to_string(), store.clone()));
        }
        if let Some(ref cache_url) = self.cache_url {
            overrides.push(("cache.url".to_string(), cache_url.clone()));
        }
        if self.no_cache {
            overrides.push(("cache.no_cache".to_string(), "true".to_string()));
        }

        ConfigSource {
            config_file: self.config_file.clone(),
            override_file: self.config_file_overrides.clone(),
            overrides,
        }
    }

    /// Convert to an AppContext for creating an App.
    pub fn to_app_context(&self) -> AppContext {
        AppContext {
            config_source: self.to_config_source(),
        }
    }
}

/// Parse a config override from "name=value" format.
fn parse_config_override(s: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid config override '{}': expected name=value", s))?;
    Ok((name.to_string(), value.to_string()))
}

// =============================================================================
// Input/Output Helpers
// =============================================================================

/// Helper for commands that read input from an argument, file, or stdin.
#[derive(Args, Debug, Default)]
pub struct InputSource {
    /// Read input from this file instead of an argument.
    #[arg(id = "input_file", short = 'f', long = "input-file")]
    pub file: Option<PathBuf>,
}

impl InputSource {
    /// Read the input value.
    ///
    /// If `arg_value` is provided, returns it (error if file is also set).
    /// If `file` is set, reads from the file.
    /// Otherwise, reads from stdin.
    pub async fn read(&self, arg_value: Option<&str>) -> Result<String> {
        match (arg_value, &self.file) {
            (Some(_), Some(_)) => Err(ArgsError::InvalidArgs(
                "cannot specify both a value argument and --input-file".to_string(),
            )),
            (Some(value), None) => Ok(value.to_string()),
            (None, Some(path)) => {
                let contents = tokio::fs::read_to_string(path).await?;
                Ok(contents.trim().to_string())
            }
            (None, None) => {
                let mut contents = String::new();
                tokio::io::stdin().read_to_string(&mut contents).await?;
                Ok(contents.trim().to_string())
            }
        }
    }
}

/// Helper for commands that write output to a file or stdout.
#[derive(Args, Debug, Default)]
pub struct OutputSink {
    /// Write output to this file instead of stdout.
    #[arg(id = "output_file", short = 'o', long = "output-file", global = true)]
    pub file: Option<PathBuf>,
}

impl OutputSink {
    /// Write a string value to the output.
    pub async fn write_str(&self, value: &str) -> Result<()> {
        match &self.file {
            Some(path) => {
                tokio::fs::write(path, value).await?;
            }
            None => {
                let mut stdout = tokio::io::stdout();
                stdout.write_all(value.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
        }
        Ok(())
    }

    /// Write a value to the output as pretty-printed JSON.
    pub async fn write_json<T: serde::Serialize>(&self, value: &T) -> Result<()> {
        let output = serde_json::to_string_pretty(value)?;
        self.write_str(&output).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config_override() {
        assert_eq!(
            parse_config_override("store.url=s3://b/k.json?region=x").unwrap(),
            ("store.url".to_string(), "s3://b/k.json?region=x".to_string())
        );
        assert!(parse_config_override("store.url").is_err());
    }

    #[test]
    fn test_shortcuts_apply_after_overrides() {
        let args = GlobalArgs {
            config_overrides: vec![("store.url".to_string(), "memory://a".to_string())],
            store: Some("memory://b".to_string()),
            cache_url: Some("redis://cache:6379".to_string()),
            no_cache: true,
            ..Default::default()
        };

        let source = args.to_config_source();
        assert_eq!(
            source.overrides,
            vec![
                ("store.url".to_string(), "memory://a".to_string()),
                ("store.url".to_string(), "memory://b".to_string()),
                ("cache.url".to_string(), "redis://cache:6379".to_string()),
                ("cache.no_cache".to_string(), "true".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_input_source() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("body.json");
        tokio::fs::write(&path, "{\"a\": 1}\n").await.unwrap();

        let from_arg = InputSource::default();
        assert_eq!(from_arg.read(Some("{}")).await.unwrap(), "{}");

        let from_file = InputSource { file: Some(path) };
        assert_eq!(from_file.read(None).await.unwrap(), "{\"a\": 1}");
        assert!(matches!(
            from_file.read(Some("{}")).await,
            Err(ArgsError::InvalidArgs(_))
        ));
    }

    #[tokio::test]
    async fn test_output_sink_writes_pretty_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let sink = OutputSink {
            file: Some(path.clone()),
        };

        sink.write_json(&json!({"a": 1})).await.unwrap();

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(written, "{\n  \"a\": 1\n}");
    }
}
