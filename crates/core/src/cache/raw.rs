//! Raw upstream deal shape as returned by the CRM list-deals endpoint.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Reference fields arrive either as a bare id or as an `{id, name, ...}`
/// shaped object depending on the upstream endpoint and record age.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdOrRef {
    Id(i64),
    Ref(RefObject),
}

/// The object form of a reference field. Extra upstream fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefObject {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl IdOrRef {
    /// Resolve to the bare id regardless of shape.
    pub fn id(&self) -> i64 {
        match self {
            Self::Id(id) => *id,
            Self::Ref(obj) => obj.id,
        }
    }
}

/// One raw deal record as fetched from the upstream API. Custom fields are
/// keyed by fixed upstream-assigned hashes and collected into `custom_fields`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDeal {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub stage_id: Option<i64>,
    #[serde(default)]
    pub pipeline_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<IdOrRef>,
    #[serde(default)]
    pub creator_user_id: Option<IdOrRef>,
    #[serde(default)]
    pub person_id: Option<IdOrRef>,
    #[serde(default)]
    pub org_id: Option<IdOrRef>,
    /// Upstream timestamps: "YYYY-MM-DD HH:MM:SS" in UTC
    #[serde(default)]
    pub add_time: Option<String>,
    #[serde(default)]
    pub won_time: Option<String>,
    #[serde(default)]
    pub lost_time: Option<String>,
    /// Everything else, including the hash-keyed custom fields
    #[serde(flatten)]
    pub custom_fields: HashMap<String, serde_json::Value>,
}
