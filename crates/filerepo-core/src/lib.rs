//! # filerepo-core
//!
//! Core crate for the multi-tenant file repository. Contains the unified
//! error system, configuration schemas, the cache provider trait, and the
//! byte stream type shared by the ingestion pipeline.
//!
//! This crate has **no** internal dependencies on other FileRepo crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
