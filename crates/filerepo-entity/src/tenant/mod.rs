//! Tenant entity and per-tenant ingestion configuration.

pub mod config;
pub mod model;

pub use config::{TenantConfig, normalize_extension};
pub use model::Tenant;
