//! Domain types and models

pub mod cache;
pub mod deal;
pub mod filter;
pub mod metrics;
pub mod org;

pub use cache::{CacheMetadata, CacheStatus, RefreshOutcome, SyncStatus};
pub use deal::{Deal, DealStatus};
pub use filter::DealFilter;
pub use metrics::{
    DashboardSummary, ExecutiveStats, FunnelStage, MiniFunnel, RankingEntry, RegionBreakdown,
    RegionRow, StageCell, TeamStats, WeeklyPoint,
};
pub use org::{CrmUser, FieldOption, Person, Team};
