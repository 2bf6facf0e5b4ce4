//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application: upstream pipeline/stage identifiers, custom-field keys,
//! cache tuning knobs and the region mapping tables.

/// Pipeline whose deals feed every core metric. Deals from other pipelines
/// are cached but excluded by the shared filter.
pub const METRICS_PIPELINE_ID: i64 = 1;

/// Secondary pipeline holding direct-meeting deals. Cached alongside the
/// metrics pipeline, queried only by the direct-meetings view.
pub const DIRECT_MEETINGS_PIPELINE_ID: i64 = 2;

/// All pipelines fetched during a refresh cycle.
pub const SYNC_PIPELINE_IDS: [i64; 2] = [METRICS_PIPELINE_ID, DIRECT_MEETINGS_PIPELINE_ID];

// Stage identifiers within the metrics pipeline
pub const DEMO_STAGE_ID: i64 = 2;
/// Stages counting as the "proposal" funnel checkpoint (a won deal also counts).
pub const PROPOSAL_STAGE_IDS: [i64; 3] = [3, 4, 5];
/// Late stages whose open deals make up an executive's "funnel actual".
pub const FUNNEL_ACTUAL_STAGE_IDS: [i64; 2] = [4, 5];
/// Single late stage whose open deals make up the current sprint value.
pub const CURRENT_SPRINT_STAGE_ID: i64 = 5;

// Custom deal field keys (upstream-assigned hashes)
pub const DEAL_TYPE_FIELD_KEY: &str = "b1e55fe3ba1c4fd7a2bb5f62f9d0f8c6aa10d1e4";
pub const COUNTRY_FIELD_KEY: &str = "4c7e3d0b9a2f41c8be6f06c1d58a9b37f20c55ad";
pub const ORIGIN_FIELD_KEY: &str = "9f12ab84d3c64be0a75e31f8c06d9e42b81f7c03";
pub const EMPLOYEE_COUNT_FIELD_KEY: &str = "27d8f40cbb154a7e9c03e6a1fd58b2963c41ea90";

// Deal type option codes
pub const DEAL_TYPE_NEW_CUSTOMER: &str = "14";
pub const DEAL_TYPE_UPSELLING: &str = "15";

// Cache tuning
/// Cached snapshot is considered stale after this many seconds.
pub const CACHE_TTL_SECS: u64 = 600;
/// Singleton metadata row key for the deal cache.
pub const DEAL_CACHE_NAME: &str = "deals";
/// Page size requested from the upstream list-deals endpoint.
pub const CRM_PAGE_SIZE: usize = 500;
/// Rows per INSERT batch during the cache replace transaction.
pub const INSERT_BATCH_SIZE: usize = 200;

/// Catch-all region for countries outside the fixed mapping.
pub const REST_OF_WORLD: &str = "Rest of World";

/// Fixed region buckets and the exact country labels belonging to each.
pub const REGIONS: [(&str, &[&str]); 6] = [
    ("DACH", &["Germany", "Austria", "Switzerland"]),
    ("Nordics", &["Sweden", "Norway", "Denmark", "Finland", "Iceland"]),
    ("UK & Ireland", &["United Kingdom", "Ireland"]),
    ("Benelux", &["Netherlands", "Belgium", "Luxembourg"]),
    ("Southern Europe", &["Spain", "Portugal", "Italy", "France", "Greece"]),
    ("North America", &["United States", "Canada", "Mexico"]),
];

/// Map an exact country label to its region bucket.
pub fn region_for_country(country_label: &str) -> &'static str {
    for (region, countries) in REGIONS {
        if countries.contains(&country_label) {
            return region;
        }
    }
    REST_OF_WORLD
}
