//! Configuration management

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CACHE_MAX_CAPACITY, DEFAULT_CACHE_TTL_SECONDS, DEFAULT_DB_PATH, DEFAULT_DB_POOL_SIZE,
    DEFAULT_MAX_BATCH_KEYS,
};
use crate::impl_domain_enum_conversions;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Guard registration table: operation id -> required flag key
    #[serde(default)]
    pub guards: BTreeMap<String, String>,
}

/// Which flag store backs the application
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Sqlite,
}

impl_domain_enum_conversions!(StorageBackend {
    Memory => "memory",
    Sqlite => "sqlite",
});

/// Flag store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_db_path")]
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

/// Evaluation limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Upper bound on keys per batch check
    #[serde(default = "default_max_batch_keys")]
    pub max_batch_keys: usize,
}

/// Read-through cache in front of flag lookups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
    #[serde(default = "default_cache_capacity")]
    pub max_capacity: u64,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl_domain_enum_conversions!(LogFormat {
    Pretty => "pretty",
    Compact => "compact",
    Json => "json",
});

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_db_path(),
            pool_size: default_pool_size(),
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self { max_batch_keys: default_max_batch_keys() }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_seconds: default_cache_ttl(),
            max_capacity: default_cache_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: LogFormat::default() }
    }
}

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

const fn default_pool_size() -> u32 {
    DEFAULT_DB_POOL_SIZE
}

const fn default_max_batch_keys() -> usize {
    DEFAULT_MAX_BATCH_KEYS
}

const fn default_cache_ttl() -> u64 {
    DEFAULT_CACHE_TTL_SECONDS
}

const fn default_cache_capacity() -> u64 {
    DEFAULT_CACHE_MAX_CAPACITY
}

fn default_log_level() -> String {
    "info".to_string()
}
