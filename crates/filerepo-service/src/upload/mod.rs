//! Upload Coordinator: end-to-end ingestion of a byte stream.

pub mod request;
pub mod service;

pub use request::IngestRequest;
pub use service::IngestService;
