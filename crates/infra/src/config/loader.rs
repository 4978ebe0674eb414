//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `SALESDESK_DB_PATH`: Database file path
//! - `SALESDESK_DB_POOL_SIZE`: Connection pool size
//! - `SALESDESK_HTTP_HOST`: HTTP listen address
//! - `SALESDESK_HTTP_PORT`: HTTP listen port
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.toml` or `./config.json` (current working directory)
//! 2. `./salesdesk.toml` or `./salesdesk.json` (current working directory)

use std::path::PathBuf;

use salesdesk_domain::{Config, DatabaseConfig, Result, SalesdeskError, ServerConfig};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `SalesdeskError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
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
/// All required environment variables must be present. Returns an error
/// if any are missing.
///
/// # Errors
/// Returns `SalesdeskError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let db_path = env_var("SALESDESK_DB_PATH")?;
    let db_pool_size = env_var("SALESDESK_DB_POOL_SIZE").and_then(|s| {
        s.parse::<u32>().map_err(|e| SalesdeskError::Config(format!("Invalid pool size: {}", e)))
    })?;

    let http_host = env_var("SALESDESK_HTTP_HOST")?;
    let http_port = env_var("SALESDESK_HTTP_PORT").and_then(|s| {
        s.parse::<u16>().map_err(|e| SalesdeskError::Config(format!("Invalid port: {}", e)))
    })?;

    Ok(Config {
        database: DatabaseConfig { path: db_path, pool_size: db_pool_size },
        server: ServerConfig { host: http_host, port: http_port },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Supports both TOML
/// and JSON formats (detected by file extension).
///
/// # Errors
/// Returns `SalesdeskError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SalesdeskError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SalesdeskError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    let contents = std::fs::read_to_string(&config_path).map_err(|e| {
        SalesdeskError::Config(format!("Failed to read {}: {}", config_path.display(), e))
    })?;

    let config = match config_path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&contents)
            .map_err(|e| SalesdeskError::Config(format!("Invalid TOML config: {}", e)))?,
        Some("json") => serde_json::from_str(&contents)
            .map_err(|e| SalesdeskError::Config(format!("Invalid JSON config: {}", e)))?,
        other => {
            return Err(SalesdeskError::Config(format!(
                "Unsupported config format: {:?}",
                other
            )))
        }
    };

    tracing::info!(path = %config_path.display(), "Configuration loaded from file");
    Ok(config)
}

fn probe_config_paths() -> Option<PathBuf> {
    const CANDIDATES: [&str; 4] =
        ["config.toml", "config.json", "salesdesk.toml", "salesdesk.json"];

    CANDIDATES.iter().map(PathBuf::from).find(|candidate| candidate.exists())
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| SalesdeskError::Config(format!("Missing environment variable: {name}")))
}
