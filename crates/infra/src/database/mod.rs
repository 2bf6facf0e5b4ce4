//! SQLite cache storage

pub mod deal_repository;
pub mod manager;
pub mod metadata_repository;
pub mod reference_repository;
pub mod team_repository;

pub use deal_repository::SqliteDealRepository;
pub use manager::{DbConnection, DbManager};
pub use metadata_repository::SqliteCacheMetadataRepository;
pub use reference_repository::SqliteReferenceRepository;
pub use team_repository::SqliteTeamDirectory;
