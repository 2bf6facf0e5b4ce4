//! Shared aggregation filter object

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Filter accepted by every aggregation query. All fields optional; an empty
/// filter matches every deal in the designated metrics pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DealFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Deal-type option code, exact match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_type: Option<String>,
    /// Country option codes, set membership
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countries: Option<Vec<String>>,
    /// Origin option codes, set membership
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origins: Option<Vec<String>>,
    /// Restrict to members of this internal team. Ignored when `person_id`
    /// is also present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<i64>,
    /// Restrict to one upstream user id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_id: Option<i64>,
}

impl DealFilter {
    /// Filter covering a closed date range with no other restrictions.
    pub fn date_range(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start_date: Some(start), end_date: Some(end), ..Self::default() }
    }
}
