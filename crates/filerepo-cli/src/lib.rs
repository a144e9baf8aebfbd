//! FileRepo command-line interface.
//!
//! Wraps the ingestion and file services for operators: ingest a local file
//! into a tenant, inspect quotas, manage stored files and run migrations.

pub mod commands;
pub mod output;

pub use commands::Cli;
