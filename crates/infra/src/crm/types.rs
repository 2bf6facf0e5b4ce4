//! Wire types for the upstream CRM REST API.

use dealboard_core::RawDeal;
use dealboard_domain::{CrmUser, FieldOption};
use serde::Deserialize;

/// Envelope shared by every list endpoint.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub additional_data: Option<AdditionalData>,
}

#[derive(Debug, Deserialize)]
pub struct AdditionalData {
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub more_items_in_collection: bool,
    #[serde(default)]
    pub next_start: Option<usize>,
}

pub type DealsResponse = ListResponse<RawDeal>;

/// Upstream user record; `active_flag` follows the upstream naming.
#[derive(Debug, Deserialize)]
pub struct RawUser {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub active_flag: bool,
}

impl From<RawUser> for CrmUser {
    fn from(raw: RawUser) -> Self {
        CrmUser { id: raw.id, name: raw.name, email: raw.email, active: raw.active_flag }
    }
}

/// Custom field definition; categorical fields carry their option lists.
#[derive(Debug, Deserialize)]
pub struct RawDealField {
    pub key: String,
    #[serde(default)]
    pub options: Option<Vec<RawFieldOption>>,
}

/// Option ids arrive as numbers but are matched as strings everywhere else.
#[derive(Debug, Deserialize)]
pub struct RawFieldOption {
    pub id: serde_json::Value,
    pub label: String,
}

impl RawDealField {
    /// Options of this field as domain records, empty when absent.
    pub fn field_options(&self) -> Vec<FieldOption> {
        self.options
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|opt| FieldOption { code: option_code(&opt.id), label: opt.label.clone() })
            .collect()
    }
}

fn option_code(id: &serde_json::Value) -> String {
    match id {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
