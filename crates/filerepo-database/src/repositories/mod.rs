//! Concrete PostgreSQL repositories, one per table.

pub mod file;
pub mod tenant;

pub use file::FileRepository;
pub use tenant::TenantRepository;
