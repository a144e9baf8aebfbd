//! # filerepo-entity
//!
//! Domain entity models for the multi-tenant file repository. Every struct
//! in this crate represents a database table row or a domain value object.
//! Database entities additionally derive `sqlx::FromRow`.

pub mod file;
pub mod quota;
pub mod tenant;
