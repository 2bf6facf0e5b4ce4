//! Conversion funnel: meetings → proposals → closings.

use dealboard_domain::constants::{DEAL_TYPE_NEW_CUSTOMER, PROPOSAL_STAGE_IDS};
use dealboard_domain::{Deal, DealStatus, FunnelStage};

use super::filter::{DateBasis, FilterContext};
use super::math::pct_rounded;

/// Three ordered stages over new-customer deals created in range. Each stage
/// is a running subset of the previous one, so counts are monotonically
/// non-increasing by construction.
pub fn conversion_funnel(deals: &[Deal], ctx: &FilterContext) -> Vec<FunnelStage> {
    let mut meetings = 0;
    let mut proposals = 0;
    let mut closings = 0;

    for deal in deals {
        if deal.deal_type.as_deref() != Some(DEAL_TYPE_NEW_CUSTOMER)
            || !ctx.matches(deal, DateBasis::Created)
        {
            continue;
        }
        meetings += 1;

        let reached_proposal =
            PROPOSAL_STAGE_IDS.contains(&deal.stage_id) || deal.status == DealStatus::Won;
        if !reached_proposal {
            continue;
        }
        proposals += 1;

        if deal.status == DealStatus::Won {
            closings += 1;
        }
    }

    let counts = [("meetings", meetings), ("proposals", proposals), ("closings", closings)];
    let first = meetings as f64;

    counts
        .iter()
        .enumerate()
        .map(|(i, (stage, count))| FunnelStage {
            stage: (*stage).to_string(),
            count: *count,
            pct_of_first: pct_rounded(*count as f64, first),
            conversion_to_next: counts
                .get(i + 1)
                .map(|(_, next)| pct_rounded(*next as f64, *count as f64)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use dealboard_domain::DealFilter;

    use super::*;
    use crate::metrics::test_fixtures::{deal, ts};

    fn nc_created(id: i64, stage_id: i64, status: DealStatus) -> Deal {
        let mut d = deal(id, status);
        d.deal_type = Some(DEAL_TYPE_NEW_CUSTOMER.into());
        d.stage_id = stage_id;
        d.add_time = Some(ts("2025-01-05 09:00:00"));
        if status == DealStatus::Won {
            d.won_time = Some(ts("2025-01-20 09:00:00"));
        }
        d
    }

    fn january() -> FilterContext {
        FilterContext::unresolved(&DealFilter::date_range(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        ))
    }

    #[test]
    fn stages_are_monotonic_subsets() {
        let deals = vec![
            nc_created(1, 1, DealStatus::Open),  // meeting only
            nc_created(2, 3, DealStatus::Open),  // reached proposal stage
            nc_created(3, 4, DealStatus::Open),  // reached proposal stage
            nc_created(4, 5, DealStatus::Won),   // closed
        ];

        let funnel = conversion_funnel(&deals, &january());
        assert_eq!(funnel.len(), 3);
        assert_eq!(funnel[0].count, 4);
        assert_eq!(funnel[1].count, 3);
        assert_eq!(funnel[2].count, 1);
        assert!(funnel[0].count >= funnel[1].count && funnel[1].count >= funnel[2].count);

        assert_eq!(funnel[0].pct_of_first, 100);
        assert_eq!(funnel[1].pct_of_first, 75);
        assert_eq!(funnel[2].pct_of_first, 25);

        assert_eq!(funnel[0].conversion_to_next, Some(75));
        assert_eq!(funnel[1].conversion_to_next, Some(33));
        assert_eq!(funnel[2].conversion_to_next, None);
    }

    #[test]
    fn empty_input_yields_zero_stages_without_nan() {
        let funnel = conversion_funnel(&[], &january());
        assert_eq!(funnel[0].count, 0);
        assert_eq!(funnel[0].pct_of_first, 0);
        assert_eq!(funnel[0].conversion_to_next, Some(0));
        assert_eq!(funnel[2].conversion_to_next, None);
    }

    #[test]
    fn won_deal_in_early_stage_still_counts_as_proposal() {
        let deals = vec![nc_created(1, 1, DealStatus::Won)];
        let funnel = conversion_funnel(&deals, &january());
        assert_eq!(funnel[1].count, 1);
        assert_eq!(funnel[2].count, 1);
    }
}
