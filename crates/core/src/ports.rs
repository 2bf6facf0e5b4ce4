//! Port interfaces implemented by the infrastructure layer

use async_trait::async_trait;
use dealboard_domain::{
    CacheMetadata, CrmUser, Deal, FieldOption, Person, Result, Team,
};

use crate::cache::raw::RawDeal;

/// Upstream CRM API, treated as a black-box paginated data source.
#[async_trait]
pub trait CrmGateway: Send + Sync {
    /// Fetch every deal of one pipeline. The adapter pages through the
    /// upstream endpoint until exhaustion; no dedup guarantee across
    /// pipelines.
    async fn fetch_pipeline_deals(&self, pipeline_id: i64) -> Result<Vec<RawDeal>>;

    /// Fetch the upstream user list.
    async fn fetch_users(&self) -> Result<Vec<CrmUser>>;

    /// Fetch the country and origin option lists from the custom field
    /// definitions. Returned as (country options, origin options).
    async fn fetch_field_options(&self) -> Result<(Vec<FieldOption>, Vec<FieldOption>)>;
}

/// Deal cache table, full-replace semantics.
#[async_trait]
pub trait DealRepository: Send + Sync {
    /// Atomically replace the entire cache with the given rows: delete all,
    /// then insert in batches, inside one transaction. A failure must leave
    /// the prior contents untouched.
    async fn replace_all(&self, deals: &[Deal]) -> Result<usize>;

    /// Read the full current snapshot.
    async fn get_all(&self) -> Result<Vec<Deal>>;

    /// Count cached rows.
    async fn count(&self) -> Result<i64>;
}

/// Metadata singleton row per cache name.
#[async_trait]
pub trait CacheMetadataRepository: Send + Sync {
    async fn get(&self, cache_name: &str) -> Result<Option<CacheMetadata>>;

    async fn upsert(&self, metadata: &CacheMetadata) -> Result<()>;
}

/// Cached upstream reference data (users, categorical field options),
/// replaced on each sync.
#[async_trait]
pub trait ReferenceRepository: Send + Sync {
    async fn replace_users(&self, users: &[CrmUser]) -> Result<()>;

    async fn get_users(&self) -> Result<Vec<CrmUser>>;

    /// Replace the options of one categorical field ("country", "origin").
    async fn replace_field_options(&self, field: &str, options: &[FieldOption]) -> Result<()>;

    async fn get_field_options(&self, field: &str) -> Result<Vec<FieldOption>>;
}

/// Internal org mapping used to resolve team filters into upstream user ids.
/// Independent of the deal cache, looked up per aggregation call.
#[async_trait]
pub trait TeamDirectory: Send + Sync {
    async fn teams(&self) -> Result<Vec<Team>>;

    async fn team(&self, team_id: i64) -> Result<Option<Team>>;

    async fn members(&self, team_id: i64) -> Result<Vec<Person>>;
}
