//! Upstream CRM REST API client

mod client;
mod types;

pub use client::{CrmClient, CrmClientConfig};
