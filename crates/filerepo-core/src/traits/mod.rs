//! Core traits defined in `filerepo-core` and implemented by other crates.

pub mod cache;

pub use cache::CacheProvider;
