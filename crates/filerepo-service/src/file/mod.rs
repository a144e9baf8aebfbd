//! File read, update and delete services plus their read-through caches.

pub mod cache;
pub mod service;

pub use cache::FileCache;
pub use service::FileService;
