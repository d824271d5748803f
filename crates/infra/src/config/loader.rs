//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `FLAGWISE_STORAGE_BACKEND` is unset, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `FLAGWISE_STORAGE_BACKEND`: `memory` or `sqlite` (required)
//! - `FLAGWISE_DB_PATH`: SQLite database file path
//! - `FLAGWISE_DB_POOL_SIZE`: Connection pool size
//! - `FLAGWISE_MAX_BATCH_KEYS`: Upper bound on keys per batch check
//! - `FLAGWISE_CACHE_ENABLED`: Whether the read-through cache is on (true/false)
//! - `FLAGWISE_CACHE_TTL_SECONDS`: Cache entry lifetime
//! - `FLAGWISE_LOG_LEVEL`: Default tracing filter directive
//! - `FLAGWISE_LOG_FORMAT`: `pretty`, `compact` or `json`
//!
//! Unset optional variables keep their defaults. Guard bindings are only
//! read from files.
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./flagwise.json` or `./flagwise.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use flagwise_domain::{Config, FlagwiseError, LogFormat, Result, StorageBackend};

/// Load configuration with automatic fallback strategy
///
/// Environment variables win when `FLAGWISE_STORAGE_BACKEND` is set. Without
/// it the loader falls back to a config file.
///
/// # Errors
/// Returns `FlagwiseError::Config` if:
/// - `FLAGWISE_STORAGE_BACKEND` is set and any env variable is invalid
/// - No config file is found when the backend variable is unset
/// - File format is invalid
pub fn load() -> Result<Config> {
    if env_opt("FLAGWISE_STORAGE_BACKEND").is_none() {
        tracing::debug!("FLAGWISE_STORAGE_BACKEND not set, loading from file");
        return load_from_file(None);
    }

    let config = load_from_env()?;
    tracing::info!("Configuration loaded from environment variables");
    Ok(config)
}

/// Load configuration from environment variables
///
/// `FLAGWISE_STORAGE_BACKEND` must be present; every other variable is
/// optional.
///
/// # Errors
/// Returns `FlagwiseError::Config` if the backend is missing or any set
/// variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.storage.backend = env_var("FLAGWISE_STORAGE_BACKEND").and_then(|s| {
        StorageBackend::from_str(&s)
            .map_err(|e| FlagwiseError::Config(format!("Invalid storage backend: {e}")))
    })?;
    if let Some(path) = env_opt("FLAGWISE_DB_PATH") {
        config.storage.path = path;
    }
    if let Some(pool_size) = env_parse::<u32>("FLAGWISE_DB_POOL_SIZE", "pool size")? {
        config.storage.pool_size = pool_size;
    }

    if let Some(max_keys) = env_parse::<usize>("FLAGWISE_MAX_BATCH_KEYS", "batch key limit")? {
        config.evaluation.max_batch_keys = max_keys;
    }

    config.cache.enabled = env_bool("FLAGWISE_CACHE_ENABLED", config.cache.enabled);
    if let Some(ttl) = env_parse::<u64>("FLAGWISE_CACHE_TTL_SECONDS", "cache TTL")? {
        config.cache.ttl_seconds = ttl;
    }

    if let Some(level) = env_opt("FLAGWISE_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(format) = env_opt("FLAGWISE_LOG_FORMAT") {
        config.logging.format = LogFormat::from_str(&format)
            .map_err(|e| FlagwiseError::Config(format!("Invalid log format: {e}")))?;
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `FlagwiseError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(FlagwiseError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            FlagwiseError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| FlagwiseError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `FlagwiseError::Config` if format is invalid or parsing fails.
pub fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| FlagwiseError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| FlagwiseError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(FlagwiseError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 4] = ["config.json", "config.toml", "flagwise.json", "flagwise.toml"];

    let mut bases = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        bases.push(cwd.clone());
        bases.push(cwd.join(".."));
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            bases.push(exe_dir.to_path_buf());
        }
    }

    bases
        .iter()
        .flat_map(|base| NAMES.iter().map(move |name| base.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `FlagwiseError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| FlagwiseError::Config(format!("Missing required environment variable: {key}")))
}

/// Optional environment variable; empty values count as unset.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse an optional numeric environment variable.
fn env_parse<T>(key: &str, what: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| FlagwiseError::Config(format!("Invalid {what} in {key}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
