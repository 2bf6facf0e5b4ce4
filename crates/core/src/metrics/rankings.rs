//! Revenue rankings by executive, team and source.

use std::collections::HashMap;

use dealboard_domain::{CrmUser, Deal, DealStatus, RankingEntry};

use super::filter::{DateBasis, FilterContext};
use super::labels::{label_for, user_label};
use super::math::round_currency;

/// User id → (team id, team name), resolved once per aggregation call.
pub type UserTeamMap = HashMap<i64, (i64, String)>;

fn won_in_range<'a>(
    deals: &'a [Deal],
    ctx: &'a FilterContext,
) -> impl Iterator<Item = &'a Deal> {
    deals
        .iter()
        .filter(move |d| d.status == DealStatus::Won && ctx.matches(d, DateBasis::Won))
}

fn into_sorted(entries: HashMap<String, (String, f64, i64)>, drop_zero: bool) -> Vec<RankingEntry> {
    let mut ranking: Vec<RankingEntry> = entries
        .into_iter()
        .filter(|(_, (_, value, _))| !drop_zero || *value != 0.0)
        .map(|(key, (label, value, deal_count))| RankingEntry {
            key,
            label,
            value: round_currency(value),
            deal_count,
        })
        .collect();
    ranking.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.label.cmp(&b.label))
    });
    ranking
}

/// Won value per upstream user, labelled from the cached user list.
pub fn ranking_by_user(deals: &[Deal], ctx: &FilterContext, users: &[CrmUser]) -> Vec<RankingEntry> {
    let mut entries: HashMap<String, (String, f64, i64)> = HashMap::new();
    for deal in won_in_range(deals, ctx) {
        let Some(user_id) = deal.user_id else { continue };
        let entry = entries
            .entry(user_id.to_string())
            .or_insert_with(|| (user_label(users, user_id), 0.0, 0));
        entry.1 += deal.value;
        entry.2 += 1;
    }
    into_sorted(entries, false)
}

/// Won value per internal team; owners outside the org mapping are skipped,
/// zero-value teams are dropped.
pub fn ranking_by_team(
    deals: &[Deal],
    ctx: &FilterContext,
    user_teams: &UserTeamMap,
) -> Vec<RankingEntry> {
    let mut entries: HashMap<String, (String, f64, i64)> = HashMap::new();
    for deal in won_in_range(deals, ctx) {
        let Some((team_id, team_name)) = deal.user_id.and_then(|id| user_teams.get(&id)) else {
            continue;
        };
        let entry = entries
            .entry(team_id.to_string())
            .or_insert_with(|| (team_name.clone(), 0.0, 0));
        entry.1 += deal.value;
        entry.2 += 1;
    }
    into_sorted(entries, true)
}

/// Won value per origin code, labelled from the cached origin options.
pub fn ranking_by_source(
    deals: &[Deal],
    ctx: &FilterContext,
    origin_labels: &HashMap<String, String>,
) -> Vec<RankingEntry> {
    let mut entries: HashMap<String, (String, f64, i64)> = HashMap::new();
    for deal in won_in_range(deals, ctx) {
        let Some(origin) = deal.origin.as_deref() else { continue };
        let entry = entries
            .entry(origin.to_string())
            .or_insert_with(|| (label_for(origin_labels, origin, "Origin"), 0.0, 0));
        entry.1 += deal.value;
        entry.2 += 1;
    }
    into_sorted(entries, false)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use dealboard_domain::DealFilter;

    use super::*;
    use crate::metrics::test_fixtures::new_customer_won;

    fn january() -> FilterContext {
        FilterContext::unresolved(&DealFilter::date_range(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        ))
    }

    fn won_by(id: i64, user_id: i64, value: f64) -> Deal {
        let mut d = new_customer_won(id, value, "2025-01-01 09:00:00", "2025-01-10 09:00:00");
        d.user_id = Some(user_id);
        d
    }

    #[test]
    fn user_ranking_sorts_descending_with_names() {
        let users = vec![
            CrmUser { id: 1, name: "Jane".into(), email: None, active: true },
            CrmUser { id: 2, name: "Ken".into(), email: None, active: true },
        ];
        let deals = vec![won_by(1, 1, 100.0), won_by(2, 2, 900.0), won_by(3, 1, 50.0)];

        let ranking = ranking_by_user(&deals, &january(), &users);
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].label, "Ken");
        assert_eq!(ranking[0].value, 900.0);
        assert_eq!(ranking[1].label, "Jane");
        assert_eq!(ranking[1].value, 150.0);
        assert_eq!(ranking[1].deal_count, 2);
    }

    #[test]
    fn unknown_user_gets_placeholder_label() {
        let ranking = ranking_by_user(&[won_by(1, 42, 10.0)], &january(), &[]);
        assert_eq!(ranking[0].label, "User 42");
    }

    #[test]
    fn team_ranking_drops_unmapped_users_and_zero_teams() {
        let user_teams: UserTeamMap =
            HashMap::from([(1, (10, "Alpha".to_string())), (2, (20, "Beta".to_string()))]);
        let mut zero_value = won_by(3, 2, 0.0);
        zero_value.value = 0.0;
        let deals = vec![won_by(1, 1, 500.0), won_by(2, 99, 800.0), zero_value];

        let ranking = ranking_by_team(&deals, &january(), &user_teams);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].label, "Alpha");
        assert_eq!(ranking[0].value, 500.0);
    }

    #[test]
    fn source_ranking_groups_by_origin_code() {
        let labels = HashMap::from([("1".to_string(), "Outbound".to_string())]);
        let mut a = won_by(1, 1, 300.0);
        a.origin = Some("1".into());
        let mut b = won_by(2, 1, 200.0);
        b.origin = Some("2".into());

        let ranking = ranking_by_source(&[a, b], &january(), &labels);
        assert_eq!(ranking[0].label, "Outbound");
        assert_eq!(ranking[1].label, "Origin 2");
    }
}
