//! Internal org mapping and cached upstream reference data

use serde::{Deserialize, Serialize};

/// Internal sales team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
}

/// Internal person, optionally mapped to an upstream CRM user id. Team
/// filters resolve through this mapping; persons without an explicit id fall
/// back to fuzzy name matching against the cached user list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub team_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crm_user_id: Option<i64>,
}

/// Upstream CRM user, cached on each sync for display names and owner
/// resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrmUser {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub active: bool,
}

/// One option of a categorical custom field (country, origin, ...), mapping
/// the stored code to its display label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldOption {
    pub code: String,
    pub label: String,
}
