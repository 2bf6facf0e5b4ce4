//! # Dealboard Domain
//!
//! Business domain types and models for Dealboard.
//!
//! This crate contains:
//! - Deal cache data types (Deal, CacheMetadata, CacheStatus)
//! - Aggregation filter and output types
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants (pipeline/stage/deal-type codes, regions)
//!
//! ## Architecture
//! - No dependencies on other Dealboard crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
