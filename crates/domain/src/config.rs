//! Application configuration structures
//!
//! Deserialized from TOML config files or assembled from environment
//! variables by the infra config loader.

use serde::{Deserialize, Serialize};

use crate::constants::CACHE_TTL_SECS;

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub crm: CrmConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Local SQLite cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: String,
    /// Connection pool size
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

/// Upstream CRM API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrmConfig {
    /// Base URL of the CRM REST API
    pub base_url: String,
    /// API token appended to every request
    pub api_token: String,
}

/// Cache refresh behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Seconds before a synced snapshot counts as stale
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Whether the background auto-refresh loop is enabled
    #[serde(default = "default_auto_refresh")]
    pub auto_refresh: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: default_ttl_secs(), auto_refresh: default_auto_refresh() }
    }
}

fn default_pool_size() -> u32 {
    4
}

fn default_ttl_secs() -> u64 {
    CACHE_TTL_SECS
}

fn default_auto_refresh() -> bool {
    true
}
