//! Regional breakdown: country code → region bucket, grouped by origin.

use std::collections::HashMap;

use dealboard_domain::constants::{
    region_for_country, DEAL_TYPE_NEW_CUSTOMER, PROPOSAL_STAGE_IDS, REGIONS, REST_OF_WORLD,
};
use dealboard_domain::{Deal, DealStatus, RegionBreakdown, RegionRow, StageCell};

use super::filter::{DateBasis, FilterContext};
use super::labels::label_for;

/// Per-(region, origin) cells with meeting / proposal / closing checkpoints.
///
/// Meetings are new-customer creations in range; proposals are deals that
/// reached a designated proposal stage or are already won; closings are won
/// deals. All-zero cells are dropped; rows within a region are sorted by
/// closing value descending. Cell values are exact sums, never rounded per
/// cell, so summing closing values across all regions reproduces the global
/// won revenue for the same filter.
pub fn region_breakdown(
    deals: &[Deal],
    ctx: &FilterContext,
    country_labels: &HashMap<String, String>,
    origin_labels: &HashMap<String, String>,
) -> Vec<RegionBreakdown> {
    let mut cells: HashMap<(&'static str, String), (StageCell, StageCell, StageCell)> =
        HashMap::new();

    for deal in deals {
        let meeting = deal.deal_type.as_deref() == Some(DEAL_TYPE_NEW_CUSTOMER)
            && ctx.matches(deal, DateBasis::Created);
        let proposal = (PROPOSAL_STAGE_IDS.contains(&deal.stage_id)
            || deal.status == DealStatus::Won)
            && ctx.matches(deal, DateBasis::Mixed);
        let closing = deal.status == DealStatus::Won && ctx.matches(deal, DateBasis::Won);

        if !meeting && !proposal && !closing {
            continue;
        }

        let region = deal
            .country
            .as_deref()
            .map_or(REST_OF_WORLD, |code| {
                region_for_country(&label_for(country_labels, code, "Country"))
            });
        let origin = deal
            .origin
            .as_deref()
            .map_or_else(|| "Unknown".to_string(), |code| label_for(origin_labels, code, "Origin"));

        let entry = cells.entry((region, origin)).or_default();
        if meeting {
            entry.0.count += 1;
            entry.0.value += deal.value;
        }
        if proposal {
            entry.1.count += 1;
            entry.1.value += deal.value;
        }
        if closing {
            entry.2.count += 1;
            entry.2.value += deal.value;
        }
    }

    let mut breakdowns = Vec::new();
    let region_order =
        REGIONS.iter().map(|(name, _)| *name).chain(std::iter::once(REST_OF_WORLD));
    for region in region_order {
        let mut rows: Vec<RegionRow> = cells
            .iter()
            .filter(|((r, _), _)| *r == region)
            .map(|((_, origin), (meeting, proposal, closing))| RegionRow {
                origin: origin.clone(),
                meeting: *meeting,
                proposal: *proposal,
                closing: *closing,
            })
            .collect();
        if rows.is_empty() {
            continue;
        }
        rows.sort_by(|a, b| {
            b.closing
                .value
                .partial_cmp(&a.closing.value)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.origin.cmp(&b.origin))
        });
        breakdowns.push(RegionBreakdown { region: region.to_string(), rows });
    }
    breakdowns
}
