//! Configuration module.

mod read_config;
mod types;

pub use read_config::{ConfigError, ConfigResult, ConfigSource, read_config};
pub use types::{CacheConfig, Config, LogConfig, LogFormat, StoreConfig};
