//! # filerepo-database
//!
//! Metadata store for FileRepo: the [`MetadataStore`] trait, its PostgreSQL
//! implementation built from per-table repositories, and an in-process
//! implementation used by tests and single-node tooling.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryMetadataStore;
pub use store::{MetadataStore, PgMetadataStore};
