//! Per-executive and per-team rollups for the teams view.
//!
//! Raw won/closed counts are carried all the way through the team roll-up and
//! only converted to a percentage at the output step, so a member with few
//! deals cannot skew the team closure rate the way averaging rounded
//! percentages would.

use std::collections::HashMap;

use dealboard_domain::constants::{
    CURRENT_SPRINT_STAGE_ID, DEAL_TYPE_NEW_CUSTOMER, DEMO_STAGE_ID, FUNNEL_ACTUAL_STAGE_IDS,
    PROPOSAL_STAGE_IDS,
};
use dealboard_domain::{CrmUser, Deal, DealStatus, ExecutiveStats, MiniFunnel, TeamStats};

use super::filter::{DateBasis, FilterContext};
use super::labels::user_label;
use super::math::{mean, mean_one_decimal, pct_one_decimal, pct_rounded, round_currency};
use super::rankings::UserTeamMap;

/// Raw per-user sums, the single source for both views.
#[derive(Debug, Default, Clone)]
struct ExecAccumulator {
    created: i64,
    won_nc: i64,
    lost_nc: i64,
    revenue_sum: f64,
    revenue_count: i64,
    cycle_sum: f64,
    cycle_count: i64,
    funnel_actual: f64,
    sprint_value: f64,
    demo_count: i64,
    demo_value: f64,
    proposal_count: i64,
    proposal_value: f64,
    won_bucket_count: i64,
    won_bucket_value: f64,
}

fn accumulate(deals: &[Deal], ctx: &FilterContext) -> HashMap<i64, ExecAccumulator> {
    let mut accs: HashMap<i64, ExecAccumulator> = HashMap::new();

    for deal in deals {
        let Some(user_id) = deal.user_id else { continue };
        let nc = deal.deal_type.as_deref() == Some(DEAL_TYPE_NEW_CUSTOMER);

        let created = nc && ctx.matches(deal, DateBasis::Created);
        let won_nc = nc && deal.status == DealStatus::Won && ctx.matches(deal, DateBasis::Won);
        let lost_nc = nc && deal.status == DealStatus::Lost && ctx.matches(deal, DateBasis::Mixed);
        let won_any = deal.status == DealStatus::Won && ctx.matches(deal, DateBasis::Won);
        let open_now = deal.status == DealStatus::Open && ctx.matches(deal, DateBasis::Any);

        if !(created || won_nc || lost_nc || won_any || open_now) {
            continue;
        }
        let acc = accs.entry(user_id).or_default();

        if created {
            acc.created += 1;
            // Mini-funnel stage buckets over the created set
            if deal.status == DealStatus::Open && deal.stage_id == DEMO_STAGE_ID {
                acc.demo_count += 1;
                acc.demo_value += deal.value;
            }
            if deal.status == DealStatus::Open && PROPOSAL_STAGE_IDS.contains(&deal.stage_id) {
                acc.proposal_count += 1;
                acc.proposal_value += deal.value;
            }
            if deal.status == DealStatus::Won {
                acc.won_bucket_count += 1;
                acc.won_bucket_value += deal.value;
            }
        }
        if won_nc {
            acc.won_nc += 1;
            if let Some(days) = deal.sales_cycle_days {
                acc.cycle_sum += days as f64;
                acc.cycle_count += 1;
            }
        }
        if lost_nc {
            acc.lost_nc += 1;
        }
        if won_any {
            acc.revenue_sum += deal.value;
            acc.revenue_count += 1;
        }
        if open_now {
            if FUNNEL_ACTUAL_STAGE_IDS.contains(&deal.stage_id) {
                acc.funnel_actual += deal.value;
            }
            if deal.stage_id == CURRENT_SPRINT_STAGE_ID {
                acc.sprint_value += deal.value;
            }
        }
    }

    accs
}

fn mini_funnel(count: i64, value: f64, created: i64) -> MiniFunnel {
    MiniFunnel {
        count,
        value: round_currency(value),
        pct_of_created: pct_rounded(count as f64, created as f64),
    }
}

fn finalize(user_id: i64, acc: &ExecAccumulator, users: &[CrmUser]) -> ExecutiveStats {
    ExecutiveStats {
        user_id,
        name: user_label(users, user_id),
        created_count: acc.created,
        won_count: acc.won_nc,
        lost_count: acc.lost_nc,
        closure_rate: pct_one_decimal(acc.won_nc as f64, (acc.won_nc + acc.lost_nc) as f64),
        revenue: round_currency(acc.revenue_sum),
        revenue_deal_count: acc.revenue_count,
        avg_ticket: round_currency(mean(acc.revenue_sum, acc.revenue_count)),
        avg_sales_cycle_days: mean_one_decimal(acc.cycle_sum, acc.cycle_count),
        funnel_actual: round_currency(acc.funnel_actual),
        current_sprint_value: round_currency(acc.sprint_value),
        demo: mini_funnel(acc.demo_count, acc.demo_value, acc.created),
        proposal: mini_funnel(acc.proposal_count, acc.proposal_value, acc.created),
        won: mini_funnel(acc.won_bucket_count, acc.won_bucket_value, acc.created),
    }
}

/// One row per upstream user with at least one matching deal, sorted by
/// revenue descending.
pub fn executive_stats(deals: &[Deal], ctx: &FilterContext, users: &[CrmUser]) -> Vec<ExecutiveStats> {
    let mut stats: Vec<ExecutiveStats> = accumulate(deals, ctx)
        .iter()
        .map(|(user_id, acc)| finalize(*user_id, acc, users))
        .collect();
    stats.sort_by(|a, b| {
        b.revenue.partial_cmp(&a.revenue).unwrap_or(std::cmp::Ordering::Equal).then_with(|| {
            a.name.cmp(&b.name)
        })
    });
    stats
}

/// Team aggregates rolled up from member executives. Owners outside the org
/// mapping are skipped; the closure rate comes from summed raw counts.
pub fn team_stats(deals: &[Deal], ctx: &FilterContext, user_teams: &UserTeamMap) -> Vec<TeamStats> {
    struct TeamAccumulator {
        name: String,
        members: usize,
        acc: ExecAccumulator,
    }

    let mut teams: HashMap<i64, TeamAccumulator> = HashMap::new();
    for (user_id, member) in accumulate(deals, ctx) {
        let Some((team_id, team_name)) = user_teams.get(&user_id) else { continue };
        let team = teams.entry(*team_id).or_insert_with(|| TeamAccumulator {
            name: team_name.clone(),
            members: 0,
            acc: ExecAccumulator::default(),
        });
        team.members += 1;
        team.acc.created += member.created;
        team.acc.won_nc += member.won_nc;
        team.acc.lost_nc += member.lost_nc;
        team.acc.revenue_sum += member.revenue_sum;
        team.acc.revenue_count += member.revenue_count;
        team.acc.cycle_sum += member.cycle_sum;
        team.acc.cycle_count += member.cycle_count;
        team.acc.funnel_actual += member.funnel_actual;
        team.acc.sprint_value += member.sprint_value;
    }

    let mut stats: Vec<TeamStats> = teams
        .into_iter()
        .map(|(team_id, team)| TeamStats {
            team_id,
            name: team.name,
            member_count: team.members,
            created_count: team.acc.created,
            won_count: team.acc.won_nc,
            lost_count: team.acc.lost_nc,
            closure_rate: pct_one_decimal(
                team.acc.won_nc as f64,
                (team.acc.won_nc + team.acc.lost_nc) as f64,
            ),
            revenue: round_currency(team.acc.revenue_sum),
            avg_ticket: round_currency(mean(team.acc.revenue_sum, team.acc.revenue_count)),
            avg_sales_cycle_days: mean_one_decimal(team.acc.cycle_sum, team.acc.cycle_count),
            funnel_actual: round_currency(team.acc.funnel_actual),
            current_sprint_value: round_currency(team.acc.sprint_value),
        })
        .collect();
    stats.sort_by(|a, b| {
        b.revenue.partial_cmp(&a.revenue).unwrap_or(std::cmp::Ordering::Equal).then_with(|| {
            a.name.cmp(&b.name)
        })
    });
    stats
}
