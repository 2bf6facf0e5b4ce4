//! # Dealboard Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The cache refresh state machine and record normalizer
//! - The aggregation query engine over the cached snapshot
//! - Port/adapter interfaces (traits)
//!
//! ## Architecture Principles
//! - Only depends on `dealboard-domain`
//! - No database or HTTP code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod cache;
pub mod metrics;
pub mod ports;

// Re-export specific items to avoid ambiguity
pub use cache::normalize::normalize_deal;
pub use cache::raw::{IdOrRef, RawDeal};
pub use cache::refresh::{RefreshService, RefreshServiceConfig};
pub use metrics::filter::{DateBasis, FilterContext};
pub use metrics::MetricsService;
pub use ports::{
    CacheMetadataRepository, CrmGateway, DealRepository, ReferenceRepository, TeamDirectory,
};
