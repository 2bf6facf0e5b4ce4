//! Dashboard summary metric.

use dealboard_domain::constants::{
    DEAL_TYPE_NEW_CUSTOMER, DEAL_TYPE_UPSELLING, DIRECT_MEETINGS_PIPELINE_ID,
};
use dealboard_domain::{DashboardSummary, Deal, DealStatus};

use super::filter::{DateBasis, FilterContext};
use super::math::{mean_one_decimal, pct_one_decimal, round_currency};

fn is_new_customer(deal: &Deal) -> bool {
    deal.deal_type.as_deref() == Some(DEAL_TYPE_NEW_CUSTOMER)
}

fn is_upselling(deal: &Deal) -> bool {
    deal.deal_type.as_deref() == Some(DEAL_TYPE_UPSELLING)
}

/// Headline numbers: revenue over all won deals, logos/meetings/closure rate/
/// ticket/cycle over the new-customer subset, plus per-type revenue splits.
pub fn dashboard_summary(deals: &[Deal], ctx: &FilterContext) -> DashboardSummary {
    let mut total_revenue = 0.0;
    let mut new_customer_revenue = 0.0;
    let mut new_customer_count = 0;
    let mut upselling_revenue = 0.0;
    let mut upselling_count = 0;

    let mut logos_won = 0;
    let mut nc_won_value = 0.0;
    let mut cycle_sum = 0.0;
    let mut cycle_count = 0;

    let mut meetings = 0;
    let mut nc_closed = 0;
    let mut nc_closed_won = 0;

    for deal in deals {
        // Won in range, any type: revenue and the per-type splits
        if deal.status == DealStatus::Won && ctx.matches(deal, DateBasis::Won) {
            total_revenue += deal.value;
            if is_new_customer(deal) {
                new_customer_revenue += deal.value;
                new_customer_count += 1;
                logos_won += 1;
                nc_won_value += deal.value;
                if let Some(days) = deal.sales_cycle_days {
                    cycle_sum += days as f64;
                    cycle_count += 1;
                }
            } else if is_upselling(deal) {
                upselling_revenue += deal.value;
                upselling_count += 1;
            }
        }

        // New-customer deals created in range: meetings
        if is_new_customer(deal) && ctx.matches(deal, DateBasis::Created) {
            meetings += 1;
        }

        // New-customer deals closed in range: closure rate denominator
        if is_new_customer(deal)
            && deal.status.is_closed()
            && ctx.matches(deal, DateBasis::Mixed)
        {
            nc_closed += 1;
            if deal.status == DealStatus::Won {
                nc_closed_won += 1;
            }
        }
    }

    DashboardSummary {
        total_revenue: round_currency(total_revenue),
        logos_won,
        meetings,
        closure_rate: pct_one_decimal(nc_closed_won as f64, nc_closed as f64),
        avg_ticket: round_currency(if logos_won == 0 { 0.0 } else { nc_won_value / logos_won as f64 }),
        avg_sales_cycle_days: mean_one_decimal(cycle_sum, cycle_count),
        new_customer_revenue: round_currency(new_customer_revenue),
        new_customer_count,
        upselling_revenue: round_currency(upselling_revenue),
        upselling_count,
    }
}

/// Direct-meetings view: deals of the secondary pipeline created in range.
/// Narrower than the shared filter, which pins the metrics pipeline.
pub fn direct_meetings_count(deals: &[Deal], ctx: &FilterContext) -> i64 {
    deals
        .iter()
        .filter(|deal| {
            deal.pipeline_id == DIRECT_MEETINGS_PIPELINE_ID
                && ctx.matches_in_pipeline(deal, DateBasis::Created)
        })
        .count() as i64
}
