//! Cached deal record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Deal lifecycle status. Created `Open`, terminal `Won` or `Lost`; the cache
/// never reverses a terminal status on its own, the next sync reflects
/// upstream truth.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    Open,
    Won,
    Lost,
}

impl DealStatus {
    /// Parse the upstream status string. Unknown values map to `Open`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "won" => Self::Won,
            "lost" => Self::Lost,
            _ => Self::Open,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// One row of the deal cache, keyed by the upstream-assigned id.
/// Rows are destroyed and fully re-inserted on every successful sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub status: DealStatus,
    pub stage_id: i64,
    pub pipeline_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub won_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lost_time: Option<DateTime<Utc>>,
    /// Deal-type option code ("new customer" vs "upselling")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_type: Option<String>,
    /// Country option code, label resolved via the cached field options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Origin option code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Employee-count option code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<String>,
    /// Whole days between add_time and won_time. Only set for won deals with
    /// both timestamps and a non-negative span.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_cycle_days: Option<i64>,
}
