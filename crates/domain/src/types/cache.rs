//! Cache metadata and refresh status types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted sync state of a cache.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    NeverSynced,
    InProgress,
    Success,
    Error,
    /// Reported (not stored) when an `InProgress` row survives a process
    /// restart, or when the snapshot is older than the TTL.
    Stale,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NeverSynced => "never_synced",
            Self::InProgress => "in_progress",
            Self::Success => "success",
            Self::Error => "error",
            Self::Stale => "stale",
        }
    }

    /// Parse the persisted status string. Unknown values map to `NeverSynced`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "in_progress" => Self::InProgress,
            "success" => Self::Success,
            "error" => Self::Error,
            "stale" => Self::Stale,
            _ => Self::NeverSynced,
        }
    }
}

/// Singleton metadata row tracking the last sync attempt for a cache,
/// upserted on every attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub cache_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync_at: Option<DateTime<Utc>>,
    pub last_sync_status: SyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync_error: Option<String>,
    pub total_records: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_duration_ms: Option<i64>,
}

impl CacheMetadata {
    /// Fresh metadata for a cache that has never synced.
    pub fn never_synced(cache_name: impl Into<String>) -> Self {
        Self {
            cache_name: cache_name.into(),
            last_sync_at: None,
            last_sync_status: SyncStatus::NeverSynced,
            last_sync_error: None,
            total_records: 0,
            sync_duration_ms: None,
        }
    }
}

/// Cache status as surfaced to operators and the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStatus {
    pub status: SyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync_at: Option<DateTime<Utc>>,
    pub total_records: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_duration_ms: Option<i64>,
    pub is_stale: bool,
    pub is_refreshing: bool,
}

/// Result of a manual or scheduled refresh trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_records: Option<i64>,
}

impl RefreshOutcome {
    pub fn completed(total_records: i64, duration_ms: i64) -> Self {
        Self {
            success: true,
            message: format!("synced {total_records} deals in {duration_ms}ms"),
            total_records: Some(total_records),
        }
    }

    pub fn rejected() -> Self {
        Self {
            success: false,
            message: "refresh already in progress".to_string(),
            total_records: None,
        }
    }

    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self { success: false, message: format!("refresh failed: {error}"), total_records: None }
    }
}
