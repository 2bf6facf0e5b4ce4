//! # Dealboard Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite cache storage (deal snapshot, metadata, reference data, org map)
//! - The upstream CRM HTTP client
//! - The background refresh scheduler
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `dealboard-core`
//! - Depends on `dealboard-domain` and `dealboard-core`
//! - Contains all "impure" code (I/O, HTTP, clocks)

pub mod config;
pub mod crm;
pub mod database;
pub mod errors;
pub mod http;
pub mod scheduling;

// Re-export commonly used items
pub use crm::CrmClient;
pub use database::{
    DbManager, SqliteCacheMetadataRepository, SqliteDealRepository, SqliteReferenceRepository,
    SqliteTeamDirectory,
};
pub use errors::InfraError;
pub use http::HttpClient;
pub use scheduling::{RefreshScheduler, RefreshSchedulerConfig, SchedulerError};
