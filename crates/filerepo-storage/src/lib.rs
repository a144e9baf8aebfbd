//! # filerepo-storage
//!
//! Local filesystem storage for committed uploads. Files are laid out as
//! `{root}/{tenant_code}/{YYYY-MM}/{file_id}{ext}` and are always created
//! exclusively; an existing path is never overwritten.

pub mod local;
pub mod partial;
pub mod paths;

pub use local::LocalStorage;
pub use partial::PartialFile;
