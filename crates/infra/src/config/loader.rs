//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from a TOML file
//!
//! ## Environment Variables
//! - `DEALBOARD_DB_PATH`: SQLite database file path (required)
//! - `DEALBOARD_DB_POOL_SIZE`: connection pool size (default 4)
//! - `DEALBOARD_CRM_BASE_URL`: upstream CRM base URL (required)
//! - `DEALBOARD_CRM_API_TOKEN`: upstream API token (required)
//! - `DEALBOARD_CACHE_TTL_SECS`: snapshot staleness threshold (default 600)
//! - `DEALBOARD_AUTO_REFRESH`: background refresh loop on/off (default true)
//!
//! ## File Locations
//! When no explicit path is given, probes `./dealboard.toml` then
//! `./config.toml` in the working directory.

use std::path::PathBuf;

use dealboard_domain::{CacheConfig, Config, CrmConfig, DatabaseConfig, DealboardError, Result};
use tracing::{debug, info};

/// Load configuration with automatic fallback strategy.
///
/// A `.env` file in the working directory is applied first, then the
/// environment is consulted; if required variables are missing the loader
/// falls back to a TOML file.
pub fn load() -> Result<Config> {
    dotenvy::dotenv().ok();

    match load_from_env() {
        Ok(config) => {
            info!("configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            debug!(error = ?e, "environment incomplete, trying config file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables. All required variables must
/// be present.
pub fn load_from_env() -> Result<Config> {
    let db_path = env_var("DEALBOARD_DB_PATH")?;
    let pool_size = env_parse("DEALBOARD_DB_POOL_SIZE", 4)?;
    let base_url = env_var("DEALBOARD_CRM_BASE_URL")?;
    let api_token = env_var("DEALBOARD_CRM_API_TOKEN")?;
    let ttl_secs =
        env_parse("DEALBOARD_CACHE_TTL_SECS", dealboard_domain::constants::CACHE_TTL_SECS)?;
    let auto_refresh = env_bool("DEALBOARD_AUTO_REFRESH", true);

    Ok(Config {
        database: DatabaseConfig { path: db_path, pool_size },
        crm: CrmConfig { base_url, api_token },
        cache: CacheConfig { ttl_secs, auto_refresh },
    })
}

/// Load configuration from a TOML file. With no explicit path, probes
/// `./dealboard.toml` then `./config.toml`.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(DealboardError::Config(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            DealboardError::Config("no config file found in the standard locations".into())
        })?,
    };

    info!(path = %config_path.display(), "loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| DealboardError::Config(format!("failed to read config file: {e}")))?;

    toml::from_str(&contents)
        .map_err(|e| DealboardError::Config(format!("invalid config file: {e}")))
}

fn probe_config_paths() -> Option<PathBuf> {
    ["dealboard.toml", "config.toml"]
        .iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| DealboardError::Config(format!("missing environment variable {name}")))
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|e| DealboardError::Config(format!("invalid value for {name}: {e}"))),
        Err(_) => Ok(default),
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_toml(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parses_a_complete_toml_file() {
        let file = write_toml(
            r#"
            [database]
            path = "/tmp/dealboard.db"
            pool_size = 8

            [crm]
            base_url = "https://crm.example.com/v1"
            api_token = "secret"

            [cache]
            ttl_secs = 300
            auto_refresh = false
            "#,
        );

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.database.path, "/tmp/dealboard.db");
        assert_eq!(config.database.pool_size, 8);
        assert_eq!(config.crm.base_url, "https://crm.example.com/v1");
        assert_eq!(config.cache.ttl_secs, 300);
        assert!(!config.cache.auto_refresh);
    }

    #[test]
    fn cache_section_is_optional_with_defaults() {
        let file = write_toml(
            r#"
            [database]
            path = "cache.db"

            [crm]
            base_url = "https://crm.example.com"
            api_token = "t"
            "#,
        );

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.database.pool_size, 4);
        assert_eq!(config.cache.ttl_secs, dealboard_domain::constants::CACHE_TTL_SECS);
        assert!(config.cache.auto_refresh);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/dealboard.toml")));
        assert!(matches!(result, Err(DealboardError::Config(_))));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let file = write_toml("not valid toml [[");
        let result = load_from_file(Some(file.path().to_path_buf()));
        assert!(matches!(result, Err(DealboardError::Config(_))));
    }
}
