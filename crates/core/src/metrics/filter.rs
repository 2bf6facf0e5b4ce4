//! Shared filter predicate applied by every aggregation query.
//!
//! The six clauses run in a fixed order and short-circuit on the first
//! failure: pipeline, deal type, country set, origin set, owner restriction,
//! date range. Owner resolution (team to upstream user ids, with fuzzy name
//! matching for unmapped persons) happens once when the context is built, not
//! per deal.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use dealboard_domain::constants::METRICS_PIPELINE_ID;
use dealboard_domain::{CrmUser, Deal, DealFilter, DealStatus, Result};
use tracing::debug;

use crate::ports::TeamDirectory;

/// Which timestamp the date-range clause inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBasis {
    /// `add_time` inside the range ("created" metrics)
    Created,
    /// `won_time` inside the range ("won" metrics)
    Won,
    /// `won_time` when the deal is won, otherwise `add_time`
    Mixed,
    /// Skip the date clause (current-state buckets such as funnel actual)
    Any,
}

/// Resolved, reusable form of a [`DealFilter`].
#[derive(Debug, Clone)]
pub struct FilterContext {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    deal_type: Option<String>,
    countries: Option<HashSet<String>>,
    origins: Option<HashSet<String>>,
    /// Upstream user ids allowed by the person/team clauses; `None` means no
    /// owner restriction.
    allowed_users: Option<HashSet<i64>>,
}

impl FilterContext {
    /// Resolve a filter against the org directory and the cached user list.
    ///
    /// A `person_id` wins over `team_id`. A team resolves to its members'
    /// upstream ids; members without an explicit mapping fall back to fuzzy
    /// name matching against the cached users. A team that resolves to no ids
    /// matches nothing rather than everything.
    pub async fn build(
        filter: &DealFilter,
        directory: &dyn TeamDirectory,
        users: &[CrmUser],
    ) -> Result<Self> {
        let allowed_users = if let Some(person_id) = filter.person_id {
            Some(HashSet::from([person_id]))
        } else if let Some(team_id) = filter.team_id {
            let members = directory.members(team_id).await?;
            let mut ids = HashSet::new();
            for member in &members {
                if let Some(crm_id) = member.crm_user_id {
                    ids.insert(crm_id);
                } else if let Some(user) = fuzzy_match_user(&member.name, users) {
                    ids.insert(user.id);
                } else {
                    debug!(person = %member.name, team_id, "no upstream user match for team member");
                }
            }
            Some(ids)
        } else {
            None
        };

        Ok(Self {
            start_date: filter.start_date,
            end_date: filter.end_date,
            deal_type: filter.deal_type.clone(),
            countries: filter.countries.as_ref().map(|c| c.iter().cloned().collect()),
            origins: filter.origins.as_ref().map(|o| o.iter().cloned().collect()),
            allowed_users,
        })
    }

    /// Context with no owner resolution needed (no team/person clause).
    pub fn unresolved(filter: &DealFilter) -> Self {
        Self {
            start_date: filter.start_date,
            end_date: filter.end_date,
            deal_type: filter.deal_type.clone(),
            countries: filter.countries.as_ref().map(|c| c.iter().cloned().collect()),
            origins: filter.origins.as_ref().map(|o| o.iter().cloned().collect()),
            allowed_users: None,
        }
    }

    /// Apply all six clauses in order, short-circuiting on the first failure.
    pub fn matches(&self, deal: &Deal, basis: DateBasis) -> bool {
        if deal.pipeline_id != METRICS_PIPELINE_ID {
            return false;
        }
        self.matches_in_pipeline(deal, basis)
    }

    /// Clauses 2-6, for views that target a different pipeline (direct
    /// meetings).
    pub fn matches_in_pipeline(&self, deal: &Deal, basis: DateBasis) -> bool {
        if let Some(deal_type) = &self.deal_type {
            if deal.deal_type.as_deref() != Some(deal_type.as_str()) {
                return false;
            }
        }

        if let Some(countries) = &self.countries {
            match &deal.country {
                Some(code) if countries.contains(code) => {}
                _ => return false,
            }
        }

        if let Some(origins) = &self.origins {
            match &deal.origin {
                Some(code) if origins.contains(code) => {}
                _ => return false,
            }
        }

        if let Some(allowed) = &self.allowed_users {
            match deal.user_id {
                Some(user_id) if allowed.contains(&user_id) => {}
                _ => return false,
            }
        }

        self.date_in_range(deal, basis)
    }

    fn date_in_range(&self, deal: &Deal, basis: DateBasis) -> bool {
        if basis == DateBasis::Any || (self.start_date.is_none() && self.end_date.is_none()) {
            return true;
        }

        let timestamp: Option<DateTime<Utc>> = match basis {
            DateBasis::Created => deal.add_time,
            DateBasis::Won => deal.won_time,
            DateBasis::Mixed => {
                if deal.status == DealStatus::Won {
                    deal.won_time
                } else {
                    deal.add_time
                }
            }
            DateBasis::Any => None,
        };

        let Some(timestamp) = timestamp else {
            return false;
        };
        let date = timestamp.date_naive();

        if let Some(start) = self.start_date {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if date > end {
                return false;
            }
        }
        true
    }
}

/// Case-insensitive name match: exact first, then containment either way.
pub(crate) fn fuzzy_match_user<'a>(name: &str, users: &'a [CrmUser]) -> Option<&'a CrmUser> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    users
        .iter()
        .find(|u| u.name.trim().to_lowercase() == needle)
        .or_else(|| {
            users.iter().find(|u| {
                let candidate = u.name.trim().to_lowercase();
                candidate.contains(&needle) || needle.contains(&candidate)
            })
        })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use dealboard_domain::constants::{DEAL_TYPE_NEW_CUSTOMER, METRICS_PIPELINE_ID};

    use super::*;
    use crate::metrics::test_fixtures::deal;

    fn ctx(filter: &DealFilter) -> FilterContext {
        FilterContext::unresolved(filter)
    }

    #[test]
    fn excludes_other_pipelines_always() {
        let mut d = deal(1, DealStatus::Open);
        d.pipeline_id = METRICS_PIPELINE_ID + 1;
        assert!(!ctx(&DealFilter::default()).matches(&d, DateBasis::Any));
    }

    #[test]
    fn deal_type_clause_is_exact() {
        let mut d = deal(1, DealStatus::Open);
        d.deal_type = Some(DEAL_TYPE_NEW_CUSTOMER.into());
        let filter =
            DealFilter { deal_type: Some(DEAL_TYPE_NEW_CUSTOMER.into()), ..DealFilter::default() };
        assert!(ctx(&filter).matches(&d, DateBasis::Any));

        d.deal_type = Some("15".into());
        assert!(!ctx(&filter).matches(&d, DateBasis::Any));
    }

    #[test]
    fn country_clause_requires_membership() {
        let mut d = deal(1, DealStatus::Open);
        d.country = Some("45".into());
        let filter = DealFilter {
            countries: Some(vec!["45".into(), "46".into()]),
            ..DealFilter::default()
        };
        assert!(ctx(&filter).matches(&d, DateBasis::Any));

        d.country = Some("99".into());
        assert!(!ctx(&filter).matches(&d, DateBasis::Any));

        d.country = None;
        assert!(!ctx(&filter).matches(&d, DateBasis::Any));
    }

    #[test]
    fn date_clause_uses_the_requested_basis() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let filter = DealFilter::date_range(start, end);

        let mut d = deal(1, DealStatus::Won);
        d.add_time = Some("2024-12-15T10:00:00Z".parse().unwrap());
        d.won_time = Some("2025-01-10T10:00:00Z".parse().unwrap());

        assert!(ctx(&filter).matches(&d, DateBasis::Won));
        assert!(!ctx(&filter).matches(&d, DateBasis::Created));
        // Mixed follows the won timestamp for won deals
        assert!(ctx(&filter).matches(&d, DateBasis::Mixed));
    }

    #[test]
    fn missing_timestamp_fails_a_bounded_date_clause() {
        let filter = DealFilter::date_range(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        );
        let d = deal(1, DealStatus::Open);
        assert!(!ctx(&filter).matches(&d, DateBasis::Created));
        // ...but passes when no date bounds are set
        assert!(ctx(&DealFilter::default()).matches(&d, DateBasis::Created));
    }

    #[test]
    fn owner_clause_restricts_to_allowed_users() {
        let mut context = ctx(&DealFilter::default());
        context.allowed_users = Some(HashSet::from([7]));

        let mut d = deal(1, DealStatus::Open);
        d.user_id = Some(7);
        assert!(context.matches(&d, DateBasis::Any));

        d.user_id = Some(8);
        assert!(!context.matches(&d, DateBasis::Any));

        d.user_id = None;
        assert!(!context.matches(&d, DateBasis::Any));
    }

    struct StubDirectory {
        members: Vec<dealboard_domain::Person>,
    }

    #[async_trait::async_trait]
    impl TeamDirectory for StubDirectory {
        async fn teams(&self) -> Result<Vec<dealboard_domain::Team>> {
            Ok(vec![dealboard_domain::Team { id: 10, name: "Alpha".into() }])
        }

        async fn team(&self, team_id: i64) -> Result<Option<dealboard_domain::Team>> {
            Ok((team_id == 10).then(|| dealboard_domain::Team { id: 10, name: "Alpha".into() }))
        }

        async fn members(&self, _team_id: i64) -> Result<Vec<dealboard_domain::Person>> {
            Ok(self.members.clone())
        }
    }

    #[test]
    fn team_clause_resolves_members_with_fuzzy_fallback() {
        let directory = StubDirectory {
            members: vec![
                dealboard_domain::Person {
                    id: 1,
                    name: "Jane Doe".into(),
                    team_id: 10,
                    crm_user_id: Some(7),
                },
                // No explicit mapping, resolved by name against cached users
                dealboard_domain::Person {
                    id: 2,
                    name: "John Roe".into(),
                    team_id: 10,
                    crm_user_id: None,
                },
                // No mapping and no name match: dropped
                dealboard_domain::Person {
                    id: 3,
                    name: "Ghost".into(),
                    team_id: 10,
                    crm_user_id: None,
                },
            ],
        };
        let users = vec![CrmUser { id: 8, name: "John Roe".into(), email: None, active: true }];
        let filter = DealFilter { team_id: Some(10), ..DealFilter::default() };

        let context =
            tokio_test::block_on(FilterContext::build(&filter, &directory, &users)).unwrap();

        let mut d = deal(1, DealStatus::Open);
        d.user_id = Some(7);
        assert!(context.matches(&d, DateBasis::Any));
        d.user_id = Some(8);
        assert!(context.matches(&d, DateBasis::Any));
        d.user_id = Some(99);
        assert!(!context.matches(&d, DateBasis::Any));
    }

    #[test]
    fn person_clause_wins_over_team() {
        let directory = StubDirectory { members: vec![] };
        let filter =
            DealFilter { team_id: Some(10), person_id: Some(42), ..DealFilter::default() };

        let context = tokio_test::block_on(FilterContext::build(&filter, &directory, &[])).unwrap();

        let mut d = deal(1, DealStatus::Open);
        d.user_id = Some(42);
        assert!(context.matches(&d, DateBasis::Any));
        d.user_id = Some(7);
        assert!(!context.matches(&d, DateBasis::Any));
    }

    #[test]
    fn empty_team_resolution_matches_nothing() {
        let directory = StubDirectory { members: vec![] };
        let filter = DealFilter { team_id: Some(10), ..DealFilter::default() };

        let context = tokio_test::block_on(FilterContext::build(&filter, &directory, &[])).unwrap();

        let mut d = deal(1, DealStatus::Open);
        d.user_id = Some(7);
        assert!(!context.matches(&d, DateBasis::Any));
    }

    #[test]
    fn fuzzy_match_prefers_exact_name() {
        let users = vec![
            CrmUser { id: 1, name: "Jane Doe".into(), email: None, active: true },
            CrmUser { id: 2, name: "Jane".into(), email: None, active: true },
        ];
        assert_eq!(fuzzy_match_user("jane", &users).map(|u| u.id), Some(2));
        assert_eq!(fuzzy_match_user("JANE DOE", &users).map(|u| u.id), Some(1));
        assert!(fuzzy_match_user("nobody", &users).is_none());
    }
}
