//! Record normalizer: raw upstream records into flat, typed cache rows.

use chrono::{DateTime, NaiveDateTime, Utc};
use dealboard_domain::constants::{
    COUNTRY_FIELD_KEY, DEAL_TYPE_FIELD_KEY, EMPLOYEE_COUNT_FIELD_KEY, ORIGIN_FIELD_KEY,
};
use dealboard_domain::{Deal, DealStatus};
use tracing::warn;

use super::raw::RawDeal;

const UPSTREAM_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Map one raw upstream record into a flat deal row.
///
/// Reference fields collapse to bare ids, custom-field codes are coerced to
/// strings, absent fields stay `None`. `sales_cycle_days` is derived only for
/// won deals with both timestamps; a negative span is rejected rather than
/// clamped so upstream clock noise cannot pollute cycle averages.
pub fn normalize_deal(raw: &RawDeal) -> Deal {
    let status = raw.status.as_deref().map(DealStatus::parse).unwrap_or(DealStatus::Open);

    let add_time = raw.add_time.as_deref().and_then(|s| parse_upstream_time(raw.id, s));
    let won_time = raw.won_time.as_deref().and_then(|s| parse_upstream_time(raw.id, s));
    let lost_time = raw.lost_time.as_deref().and_then(|s| parse_upstream_time(raw.id, s));

    Deal {
        id: raw.id,
        title: raw.title.clone(),
        value: raw.value.unwrap_or(0.0),
        currency: raw.currency.clone(),
        status,
        stage_id: raw.stage_id.unwrap_or(0),
        pipeline_id: raw.pipeline_id.unwrap_or(0),
        user_id: raw.user_id.as_ref().map(|r| r.id()),
        creator_user_id: raw.creator_user_id.as_ref().map(|r| r.id()),
        add_time,
        won_time,
        lost_time,
        deal_type: custom_code(raw, DEAL_TYPE_FIELD_KEY),
        country: custom_code(raw, COUNTRY_FIELD_KEY),
        origin: custom_code(raw, ORIGIN_FIELD_KEY),
        employee_count: custom_code(raw, EMPLOYEE_COUNT_FIELD_KEY),
        sales_cycle_days: sales_cycle_days(status, add_time, won_time),
    }
}

/// Whole days between creation and winning, rounded to nearest. Only defined
/// for won deals with both timestamps and a non-negative span.
pub fn sales_cycle_days(
    status: DealStatus,
    add_time: Option<DateTime<Utc>>,
    won_time: Option<DateTime<Utc>>,
) -> Option<i64> {
    if status != DealStatus::Won {
        return None;
    }
    let (added, won) = (add_time?, won_time?);
    let seconds = (won - added).num_seconds();
    if seconds < 0 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    Some((seconds as f64 / 86_400.0).round() as i64)
}

/// Pull a categorical code out of the hash-keyed custom fields, coercing
/// scalar values to strings the way the upstream option lists are keyed.
fn custom_code(raw: &RawDeal, key: &str) -> Option<String> {
    match raw.custom_fields.get(key)? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => {
            Some(n.as_i64().map_or_else(|| n.to_string(), |i| i.to_string()))
        }
        _ => None,
    }
}

fn parse_upstream_time(deal_id: i64, raw: &str) -> Option<DateTime<Utc>> {
    match NaiveDateTime::parse_from_str(raw, UPSTREAM_TIME_FORMAT) {
        Ok(naive) => Some(naive.and_utc()),
        Err(err) => {
            warn!(deal_id, raw, error = %err, "unparseable upstream timestamp");
            None
        }
    }
}
