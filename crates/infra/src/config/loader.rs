//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `DOCSYNC_DB_PATH` is not set, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `DOCSYNC_DB_PATH`: Database file path (required for env loading)
//! - `DOCSYNC_DB_POOL_SIZE`: Connection pool size
//! - `DOCSYNC_FETCH_TIMEOUT_MS`: Upper bound for one document download
//! - `DOCSYNC_NETWORK_RETRY_DELAY_MS`: First backoff step while the server is
//!   unreachable
//! - `DOCSYNC_MAX_NETWORK_RETRY_DELAY_MS`: Backoff ceiling
//! - `DOCSYNC_CLOCK_SKEW_TOLERANCE_MS`: Reconciliation tolerance
//! - `DOCSYNC_ERROR_HISTORY_LIMIT`: Errors kept in the published state
//! - `DOCSYNC_PROBE_URL`: URL polled for connectivity (optional)
//! - `DOCSYNC_PROBE_INTERVAL_SECS`: Interval between probes
//! - `DOCSYNC_CATALOG_PATH`: JSON catalog snapshot file (optional)
//! - `DOCSYNC_LOG_LEVEL`: Default log filter
//! - `DOCSYNC_LOG_JSON`: Emit JSON logs (true/false)
//!
//! Optional variables fall back to the [`Config`] defaults.
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./docsync.json` or `./docsync.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use docsync_domain::{Config, DocSyncError, Result};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the database path
/// is missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `DocSyncError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `DocSyncError::Config` if `DOCSYNC_DB_PATH` is missing or a
/// numeric variable does not parse.
pub fn load_from_env() -> Result<Config> {
    let defaults = Config::default();
    let mut config = defaults.clone();

    config.database.path = env_var("DOCSYNC_DB_PATH")?;
    config.database.pool_size = env_parse("DOCSYNC_DB_POOL_SIZE", defaults.database.pool_size)?;

    let sync = &mut config.sync;
    sync.fetch_timeout_ms = env_parse("DOCSYNC_FETCH_TIMEOUT_MS", sync.fetch_timeout_ms)?;
    sync.network_retry_delay_ms =
        env_parse("DOCSYNC_NETWORK_RETRY_DELAY_MS", sync.network_retry_delay_ms)?;
    sync.max_network_retry_delay_ms =
        env_parse("DOCSYNC_MAX_NETWORK_RETRY_DELAY_MS", sync.max_network_retry_delay_ms)?;
    sync.clock_skew_tolerance_ms =
        env_parse("DOCSYNC_CLOCK_SKEW_TOLERANCE_MS", sync.clock_skew_tolerance_ms)?;
    sync.error_history_limit = env_parse("DOCSYNC_ERROR_HISTORY_LIMIT", sync.error_history_limit)?;
    sync.probe_url = std::env::var("DOCSYNC_PROBE_URL").ok().filter(|url| !url.trim().is_empty());
    sync.probe_interval_secs = env_parse("DOCSYNC_PROBE_INTERVAL_SECS", sync.probe_interval_secs)?;
    sync.catalog_path =
        std::env::var("DOCSYNC_CATALOG_PATH").ok().filter(|path| !path.trim().is_empty());

    if let Ok(level) = std::env::var("DOCSYNC_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("DOCSYNC_LOG_JSON", defaults.logging.json);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `DocSyncError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(DocSyncError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            DocSyncError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| DocSyncError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| DocSyncError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| DocSyncError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(DocSyncError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(config_candidates(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(config_candidates(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn config_candidates(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("docsync.json"),
        dir.join("docsync.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
    ]
}

/// Get required environment variable
///
/// # Errors
/// Returns `DocSyncError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        DocSyncError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Parse an optional environment variable, keeping `default` when unset
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| DocSyncError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
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

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::TempDir;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 12] = [
        "DOCSYNC_DB_PATH",
        "DOCSYNC_DB_POOL_SIZE",
        "DOCSYNC_FETCH_TIMEOUT_MS",
        "DOCSYNC_NETWORK_RETRY_DELAY_MS",
        "DOCSYNC_MAX_NETWORK_RETRY_DELAY_MS",
        "DOCSYNC_CLOCK_SKEW_TOLERANCE_MS",
        "DOCSYNC_ERROR_HISTORY_LIMIT",
        "DOCSYNC_PROBE_URL",
        "DOCSYNC_PROBE_INTERVAL_SECS",
        "DOCSYNC_CATALOG_PATH",
        "DOCSYNC_LOG_LEVEL",
        "DOCSYNC_LOG_JSON",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        for (key, value) in [("T1", "1"), ("T2", "TRUE"), ("T3", "yes"), ("T4", "on")] {
            let key = format!("DOCSYNC_TEST_BOOL_{key}");
            std::env::set_var(&key, value);
            assert!(env_bool(&key, false), "{value}");
            std::env::remove_var(&key);
        }

        std::env::set_var("DOCSYNC_TEST_BOOL_OFF", "off");
        assert!(!env_bool("DOCSYNC_TEST_BOOL_OFF", true));
        std::env::remove_var("DOCSYNC_TEST_BOOL_OFF");

        assert!(env_bool("DOCSYNC_TEST_BOOL_MISSING", true));
    }

    #[test]
    fn test_load_from_env_uses_defaults_for_optional_vars() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("DOCSYNC_DB_PATH", "/tmp/docsync-test.db");

        let config = load_from_env().expect("config from env");

        assert_eq!(config.database.path, "/tmp/docsync-test.db");
        assert_eq!(config.database.pool_size, Config::default().database.pool_size);
        assert_eq!(config.sync, Config::default().sync);
        clear_env();
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("DOCSYNC_DB_PATH", "/tmp/docsync-test.db");
        std::env::set_var("DOCSYNC_DB_POOL_SIZE", "2");
        std::env::set_var("DOCSYNC_FETCH_TIMEOUT_MS", "9000");
        std::env::set_var("DOCSYNC_NETWORK_RETRY_DELAY_MS", "500");
        std::env::set_var("DOCSYNC_MAX_NETWORK_RETRY_DELAY_MS", "8000");
        std::env::set_var("DOCSYNC_CLOCK_SKEW_TOLERANCE_MS", "0");
        std::env::set_var("DOCSYNC_ERROR_HISTORY_LIMIT", "5");
        std::env::set_var("DOCSYNC_PROBE_URL", "https://docs.example/health");
        std::env::set_var("DOCSYNC_PROBE_INTERVAL_SECS", "30");
        std::env::set_var("DOCSYNC_CATALOG_PATH", "/tmp/catalog.json");
        std::env::set_var("DOCSYNC_LOG_LEVEL", "debug");
        std::env::set_var("DOCSYNC_LOG_JSON", "true");

        let config = load_from_env().expect("config from env");

        assert_eq!(config.database.pool_size, 2);
        assert_eq!(config.sync.fetch_timeout_ms, 9000);
        assert_eq!(config.sync.network_retry_delay_ms, 500);
        assert_eq!(config.sync.max_network_retry_delay_ms, 8000);
        assert_eq!(config.sync.clock_skew_tolerance_ms, 0);
        assert_eq!(config.sync.error_history_limit, 5);
        assert_eq!(config.sync.probe_url.as_deref(), Some("https://docs.example/health"));
        assert_eq!(config.sync.probe_interval_secs, 30);
        assert_eq!(config.sync.catalog_path.as_deref(), Some("/tmp/catalog.json"));
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        clear_env();
    }

    #[test]
    fn test_load_from_env_missing_db_path() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let err = load_from_env().unwrap_err();

        assert!(matches!(err, DocSyncError::Config(_)), "Should be a Config error");
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("DOCSYNC_DB_PATH", "/tmp/docsync-test.db");
        std::env::set_var("DOCSYNC_DB_POOL_SIZE", "not-a-number");

        let err = load_from_env().unwrap_err();

        assert!(err.to_string().contains("DOCSYNC_DB_POOL_SIZE"), "got {err}");
        clear_env();
    }

    #[test]
    fn test_load_from_file_json_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "database": { "path": "json.db" }, "sync": { "fetch_timeout_ms": 1000 } }"#)
            .unwrap();

        let config = load_from_file(Some(path)).expect("json config");

        assert_eq!(config.database.path, "json.db");
        assert_eq!(config.database.pool_size, Config::default().database.pool_size);
        assert_eq!(config.sync.fetch_timeout_ms, 1000);
        assert_eq!(config.logging, Config::default().logging);
    }

    #[test]
    fn test_load_from_file_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docsync.toml");
        std::fs::write(
            &path,
            "[database]\npath = \"toml.db\"\npool_size = 3\n\n[sync]\nprobe_url = \"https://docs.example\"\n\n[logging]\njson = true\n",
        )
        .unwrap();

        let config = load_from_file(Some(path)).expect("toml config");

        assert_eq!(config.database.path, "toml.db");
        assert_eq!(config.database.pool_size, 3);
        assert_eq!(config.sync.probe_url.as_deref(), Some("https://docs.example"));
        assert!(config.logging.json);
    }

    #[test]
    fn test_load_from_file_rejects_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "database: {}").unwrap();

        let err = load_from_file(Some(path)).unwrap_err();

        assert!(err.to_string().contains("Unsupported config format"));
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = load_from_file(Some(PathBuf::from("/definitely/not/here.json"))).unwrap_err();

        assert!(matches!(err, DocSyncError::Config(_)));
    }
}
