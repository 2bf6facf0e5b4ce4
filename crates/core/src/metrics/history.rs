//! Weekly time series: revenue of won deals, meetings created.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use dealboard_domain::constants::DEAL_TYPE_NEW_CUSTOMER;
use dealboard_domain::{Deal, DealStatus, WeeklyPoint};

use super::filter::{DateBasis, FilterContext};
use super::math::round_currency;

/// ISO-8601 week key, `{iso_year}-W{week:02}`. Zero-padding keeps plain
/// string comparison chronological within a year; BTreeMap ordering handles
/// the rest.
pub fn week_key(timestamp: DateTime<Utc>) -> String {
    let iso = timestamp.date_naive().iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

/// Value of won deals per week of their winning.
pub fn revenue_history(deals: &[Deal], ctx: &FilterContext) -> Vec<WeeklyPoint> {
    let mut weeks: BTreeMap<String, f64> = BTreeMap::new();
    for deal in deals {
        if deal.status != DealStatus::Won || !ctx.matches(deal, DateBasis::Won) {
            continue;
        }
        let Some(won_time) = deal.won_time else { continue };
        *weeks.entry(week_key(won_time)).or_insert(0.0) += deal.value;
    }
    weeks
        .into_iter()
        .map(|(week, value)| WeeklyPoint { week, value: round_currency(value) })
        .collect()
}

/// Count of new-customer deals per week of their creation.
pub fn meetings_history(deals: &[Deal], ctx: &FilterContext) -> Vec<WeeklyPoint> {
    let mut weeks: BTreeMap<String, f64> = BTreeMap::new();
    for deal in deals {
        if deal.deal_type.as_deref() != Some(DEAL_TYPE_NEW_CUSTOMER)
            || !ctx.matches(deal, DateBasis::Created)
        {
            continue;
        }
        let Some(add_time) = deal.add_time else { continue };
        *weeks.entry(week_key(add_time)).or_insert(0.0) += 1.0;
    }
    weeks.into_iter().map(|(week, value)| WeeklyPoint { week, value }).collect()
}

#[cfg(test)]
mod tests {
    use dealboard_domain::DealFilter;

    use super::*;
    use crate::metrics::test_fixtures::{new_customer_won, ts};

    #[test]
    fn week_key_is_iso_and_zero_padded() {
        assert_eq!(week_key(ts("2025-01-06 00:00:00")), "2025-W02");
        assert_eq!(week_key(ts("2025-03-03 12:00:00")), "2025-W10");
        // ISO semantics: Jan 1 2027 belongs to week 53 of 2026
        assert_eq!(week_key(ts("2027-01-01 00:00:00")), "2026-W53");
    }

    #[test]
    fn revenue_buckets_sum_per_week_in_order() {
        let deals = vec![
            new_customer_won(1, 100.0, "2025-01-01 09:00:00", "2025-01-06 09:00:00"),
            new_customer_won(2, 250.0, "2025-01-01 09:00:00", "2025-01-08 09:00:00"),
            new_customer_won(3, 400.0, "2025-01-01 09:00:00", "2025-01-13 09:00:00"),
        ];
        let ctx = FilterContext::unresolved(&DealFilter::default());

        let series = revenue_history(&deals, &ctx);
        assert_eq!(
            series,
            vec![
                WeeklyPoint { week: "2025-W02".into(), value: 350.0 },
                WeeklyPoint { week: "2025-W03".into(), value: 400.0 },
            ]
        );
    }

    #[test]
    fn meetings_count_new_customer_creations() {
        let deals = vec![
            new_customer_won(1, 100.0, "2025-01-06 09:00:00", "2025-02-01 09:00:00"),
            new_customer_won(2, 100.0, "2025-01-07 09:00:00", "2025-02-01 09:00:00"),
        ];
        let ctx = FilterContext::unresolved(&DealFilter::default());

        let series = meetings_history(&deals, &ctx);
        assert_eq!(series, vec![WeeklyPoint { week: "2025-W02".into(), value: 2.0 }]);
    }
}
