//! # filerepo-service
//!
//! Business logic for the multi-tenant file repository. The centrepiece is
//! the [`IngestService`], which turns a raw byte stream into a validated,
//! quota-checked, durably stored file record while holding a per-filename
//! upload lock.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod context;
pub mod file;
pub mod lock;
pub mod quota;
pub mod tenant;
pub mod upload;
pub mod validation;

pub use context::TenantContext;
pub use file::{FileCache, FileService};
pub use lock::{UploadLock, UploadLockManager};
pub use quota::QuotaLedger;
pub use tenant::TenantService;
pub use upload::{IngestRequest, IngestService};
pub use validation::{ValidationEngine, ZipDepthInspector};
