//! Aggregation output types
//!
//! Every struct here is the JSON-serializable shape handed to the
//! presentation layer. Monetary values are rounded to whole currency units at
//! construction time; accumulation happens upstream in f64.

use serde::{Deserialize, Serialize};

/// Headline dashboard numbers for one filter window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSummary {
    /// Sum of value over all won deals in range, any deal type
    pub total_revenue: f64,
    /// Won new-customer deals in range
    pub logos_won: i64,
    /// New-customer deals created in range
    pub meetings: i64,
    /// won / (won + lost) among closed new-customer deals, percent, 1 decimal
    pub closure_rate: f64,
    /// Mean value of won new-customer deals
    pub avg_ticket: f64,
    /// Mean sales-cycle days over won new-customer deals with a defined cycle
    pub avg_sales_cycle_days: f64,
    pub new_customer_revenue: f64,
    pub new_customer_count: i64,
    pub upselling_revenue: f64,
    pub upselling_count: i64,
}

/// One point of a weekly time series, keyed `{iso_year}-W{iso_week:02}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeeklyPoint {
    pub week: String,
    pub value: f64,
}

/// Count and summed value for one lifecycle checkpoint of a region cell.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct StageCell {
    pub count: i64,
    pub value: f64,
}

impl StageCell {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// One (region, origin) row of the regional breakdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionRow {
    pub origin: String,
    pub meeting: StageCell,
    pub proposal: StageCell,
    pub closing: StageCell,
}

/// All rows of one region, sorted by closing value descending.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionBreakdown {
    pub region: String,
    pub rows: Vec<RegionRow>,
}

/// One stage of the meetings → proposals → closings funnel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunnelStage {
    pub stage: String,
    pub count: i64,
    /// Percentage relative to the first stage, integer-rounded
    pub pct_of_first: i64,
    /// stage(i+1) / stage(i), integer-rounded percent; None on the last stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion_to_next: Option<i64>,
}

/// One row of a ranking (by user, team or source).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankingEntry {
    /// Group key: user id, team id or origin code
    pub key: String,
    pub label: String,
    pub value: f64,
    pub deal_count: i64,
}

/// One stage bucket of an executive's mini-funnel.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct MiniFunnel {
    pub count: i64,
    pub value: f64,
    /// Integer-rounded percentage of the executive's created count
    pub pct_of_created: i64,
}

/// Per-executive rollup for the teams view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutiveStats {
    pub user_id: i64,
    pub name: String,
    /// New-customer deals created in range
    pub created_count: i64,
    /// New-customer deals won in range
    pub won_count: i64,
    /// New-customer deals lost in range
    pub lost_count: i64,
    pub closure_rate: f64,
    /// All-type won value in range
    pub revenue: f64,
    pub revenue_deal_count: i64,
    pub avg_ticket: f64,
    pub avg_sales_cycle_days: f64,
    /// Value of open deals sitting in the designated late stages
    pub funnel_actual: f64,
    /// Value of open deals in the current-sprint stage
    pub current_sprint_value: f64,
    pub demo: MiniFunnel,
    pub proposal: MiniFunnel,
    pub won: MiniFunnel,
}

/// Team rollup: sums of member counts with the closure rate recomputed from
/// the summed won/closed totals rather than averaged percentages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamStats {
    pub team_id: i64,
    pub name: String,
    pub member_count: usize,
    pub created_count: i64,
    pub won_count: i64,
    pub lost_count: i64,
    pub closure_rate: f64,
    pub revenue: f64,
    pub avg_ticket: f64,
    pub avg_sales_cycle_days: f64,
    pub funnel_actual: f64,
    pub current_sprint_value: f64,
}
