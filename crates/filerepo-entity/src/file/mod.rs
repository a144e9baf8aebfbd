//! File record entity and its mutable attributes.

pub mod attributes;
pub mod model;

pub use attributes::{FileAttributes, validate_tag};
pub use model::{FileId, FileRecord, NewFileRecord};
