//! Aggregation query engine over the cached deal snapshot.
//!
//! Every query reads the full snapshot, builds one [`FilterContext`], and
//! runs a pure aggregation function over it. The pure functions live in the
//! submodules and take plain slices, so they are testable without any
//! repository wiring; [`MetricsService`] is the thin orchestration layer that
//! loads the snapshot and reference data through the ports.

pub mod filter;
pub mod funnel;
pub mod history;
pub mod labels;
pub mod math;
pub mod rankings;
pub mod regions;
pub mod summary;
pub mod teams;

use std::collections::HashMap;
use std::sync::Arc;

use dealboard_domain::{
    DashboardSummary, Deal, DealFilter, ExecutiveStats, FunnelStage, RankingEntry,
    RegionBreakdown, Result, TeamStats, WeeklyPoint,
};
use tracing::debug;

use crate::ports::{DealRepository, ReferenceRepository, TeamDirectory};

use filter::FilterContext;
use rankings::UserTeamMap;

/// Option field names as stored by the reference repository.
const COUNTRY_FIELD: &str = "country";
const ORIGIN_FIELD: &str = "origin";

/// Loaded state shared by one aggregation call: the snapshot, the cached
/// upstream users, and the resolved filter.
struct QueryInput {
    deals: Vec<Deal>,
    users: Vec<dealboard_domain::CrmUser>,
    ctx: FilterContext,
}

/// Read side of the service: all dashboard aggregations over the cache.
pub struct MetricsService {
    deals: Arc<dyn DealRepository>,
    reference: Arc<dyn ReferenceRepository>,
    directory: Arc<dyn TeamDirectory>,
}

impl MetricsService {
    pub fn new(
        deals: Arc<dyn DealRepository>,
        reference: Arc<dyn ReferenceRepository>,
        directory: Arc<dyn TeamDirectory>,
    ) -> Self {
        Self { deals, reference, directory }
    }

    async fn load(&self, filter: &DealFilter) -> Result<QueryInput> {
        let deals = self.deals.get_all().await?;
        let users = self.reference.get_users().await?;
        let ctx = FilterContext::build(filter, self.directory.as_ref(), &users).await?;
        debug!(snapshot_size = deals.len(), "running aggregation over cached snapshot");
        Ok(QueryInput { deals, users, ctx })
    }

    async fn option_labels(&self, field: &str) -> Result<HashMap<String, String>> {
        let options = self.reference.get_field_options(field).await?;
        Ok(labels::option_map(&options))
    }

    /// User id → (team id, team name) over the whole org mapping, using the
    /// same fuzzy name fallback as the filter's team clause.
    async fn user_team_map(&self, users: &[dealboard_domain::CrmUser]) -> Result<UserTeamMap> {
        let mut map = UserTeamMap::new();
        for team in self.directory.teams().await? {
            for member in self.directory.members(team.id).await? {
                let crm_id = member
                    .crm_user_id
                    .or_else(|| filter::fuzzy_match_user(&member.name, users).map(|u| u.id));
                match crm_id {
                    Some(id) => {
                        map.insert(id, (team.id, team.name.clone()));
                    }
                    None => {
                        debug!(person = %member.name, team = %team.name, "unmapped team member")
                    }
                }
            }
        }
        Ok(map)
    }

    pub async fn dashboard_summary(&self, filter: &DealFilter) -> Result<DashboardSummary> {
        let input = self.load(filter).await?;
        Ok(summary::dashboard_summary(&input.deals, &input.ctx))
    }

    pub async fn direct_meetings_count(&self, filter: &DealFilter) -> Result<i64> {
        let input = self.load(filter).await?;
        Ok(summary::direct_meetings_count(&input.deals, &input.ctx))
    }

    pub async fn revenue_history(&self, filter: &DealFilter) -> Result<Vec<WeeklyPoint>> {
        let input = self.load(filter).await?;
        Ok(history::revenue_history(&input.deals, &input.ctx))
    }

    pub async fn meetings_history(&self, filter: &DealFilter) -> Result<Vec<WeeklyPoint>> {
        let input = self.load(filter).await?;
        Ok(history::meetings_history(&input.deals, &input.ctx))
    }

    pub async fn region_breakdown(&self, filter: &DealFilter) -> Result<Vec<RegionBreakdown>> {
        let input = self.load(filter).await?;
        let countries = self.option_labels(COUNTRY_FIELD).await?;
        let origins = self.option_labels(ORIGIN_FIELD).await?;
        Ok(regions::region_breakdown(&input.deals, &input.ctx, &countries, &origins))
    }

    pub async fn conversion_funnel(&self, filter: &DealFilter) -> Result<Vec<FunnelStage>> {
        let input = self.load(filter).await?;
        Ok(funnel::conversion_funnel(&input.deals, &input.ctx))
    }

    pub async fn ranking_by_user(&self, filter: &DealFilter) -> Result<Vec<RankingEntry>> {
        let input = self.load(filter).await?;
        Ok(rankings::ranking_by_user(&input.deals, &input.ctx, &input.users))
    }

    pub async fn ranking_by_team(&self, filter: &DealFilter) -> Result<Vec<RankingEntry>> {
        let input = self.load(filter).await?;
        let user_teams = self.user_team_map(&input.users).await?;
        Ok(rankings::ranking_by_team(&input.deals, &input.ctx, &user_teams))
    }

    pub async fn ranking_by_source(&self, filter: &DealFilter) -> Result<Vec<RankingEntry>> {
        let input = self.load(filter).await?;
        let origins = self.option_labels(ORIGIN_FIELD).await?;
        Ok(rankings::ranking_by_source(&input.deals, &input.ctx, &origins))
    }

    pub async fn executive_stats(&self, filter: &DealFilter) -> Result<Vec<ExecutiveStats>> {
        let input = self.load(filter).await?;
        Ok(teams::executive_stats(&input.deals, &input.ctx, &input.users))
    }

    pub async fn team_stats(&self, filter: &DealFilter) -> Result<Vec<TeamStats>> {
        let input = self.load(filter).await?;
        let user_teams = self.user_team_map(&input.users).await?;
        Ok(teams::team_stats(&input.deals, &input.ctx, &user_teams))
    }
}

#[cfg(test)]
pub mod test_fixtures {
    //! Deal builders shared by the aggregation tests.

    use chrono::{DateTime, NaiveDateTime, Utc};
    use dealboard_domain::constants::{DEAL_TYPE_NEW_CUSTOMER, METRICS_PIPELINE_ID};
    use dealboard_domain::{Deal, DealStatus};

    pub fn ts(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap().and_utc()
    }

    /// Bare deal in the metrics pipeline with every optional field unset.
    pub fn deal(id: i64, status: DealStatus) -> Deal {
        Deal {
            id,
            title: None,
            value: 0.0,
            currency: None,
            status,
            stage_id: 1,
            pipeline_id: METRICS_PIPELINE_ID,
            user_id: None,
            creator_user_id: None,
            add_time: None,
            won_time: None,
            lost_time: None,
            deal_type: None,
            country: None,
            origin: None,
            employee_count: None,
            sales_cycle_days: None,
        }
    }

    /// Won new-customer deal with both lifecycle timestamps set.
    pub fn new_customer_won(id: i64, value: f64, add: &str, won: &str) -> Deal {
        let add_time = ts(add);
        let won_time = ts(won);
        let cycle = ((won_time - add_time).num_seconds() as f64 / 86_400.0).round() as i64;
        Deal {
            value,
            deal_type: Some(DEAL_TYPE_NEW_CUSTOMER.into()),
            add_time: Some(add_time),
            won_time: Some(won_time),
            sales_cycle_days: Some(cycle),
            ..deal(id, DealStatus::Won)
        }
    }
}
