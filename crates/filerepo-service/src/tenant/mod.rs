//! Tenant resolution.

pub mod service;

pub use service::TenantService;
