//! Background scheduling

pub mod error;
pub mod refresh_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use refresh_scheduler::{RefreshScheduler, RefreshSchedulerConfig};
