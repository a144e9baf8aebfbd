//! Validation Engine: checks a candidate file against its tenant's rules.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. zero-byte content
//! 2. size limit (`ceil(size / 1024) > max_upload_size_kb`)
//! 3. forbidden extension
//! 4. extension allow-list (an empty list allows nothing)
//! 5. forbidden / allowed MIME type, same rules
//! 6. nested-archive depth, for archive extensions only

pub mod archive;
pub mod content;
pub mod filename;

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use filerepo_core::error::AppError;
use filerepo_core::result::AppResult;
use filerepo_entity::tenant::TenantConfig;

pub use archive::{ArchiveError, ZipDepthInspector, is_archive_name};

/// A file (or the part of it received so far) being validated.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Normalized extension, `.ext` or empty.
    pub extension: &'a str,
    /// Effective media type.
    pub media_type: &'a str,
    /// Bytes received so far, or the final size.
    pub size_bytes: u64,
}

/// Stateless validator of candidates against a [`TenantConfig`].
#[derive(Debug, Clone, Default)]
pub struct ValidationEngine {
    inspector: ZipDepthInspector,
    /// Reject when archive inspection hits an unexpected I/O error.
    archive_fail_closed: bool,
}

impl ValidationEngine {
    pub fn new(archive_fail_closed: bool) -> Self {
        Self {
            inspector: ZipDepthInspector,
            archive_fail_closed,
        }
    }

    /// Steps 1-5. Cheap enough to run after every received chunk.
    pub fn check_limits(config: &TenantConfig, candidate: &Candidate<'_>) -> AppResult<()> {
        if candidate.size_bytes == 0 {
            return Err(AppError::validation("Empty files are not allowed"));
        }

        if let Some(max_kb) = config.max_upload_size_kb
            && candidate.size_bytes.div_ceil(1024) > max_kb
        {
            return Err(AppError::validation("File exceeds maximum allowed size"));
        }

        let ext = candidate.extension;
        if config.forbids_extension(ext) {
            return Err(AppError::validation("File extension is forbidden"));
        }
        if !config.allows_extension(ext) {
            return Err(AppError::validation("File extension not allowed"));
        }

        let mime = candidate.media_type.to_lowercase();
        if config.forbids_mime_type(&mime) {
            return Err(AppError::validation("MIME type is forbidden"));
        }
        if !config.allows_mime_type(&mime) {
            return Err(AppError::validation("MIME type not allowed"));
        }

        Ok(())
    }

    /// All steps, including archive inspection of the file at `path`.
    pub async fn validate(
        &self,
        config: &TenantConfig,
        candidate: &Candidate<'_>,
        path: Option<&Path>,
    ) -> AppResult<()> {
        Self::check_limits(config, candidate)?;

        match path {
            Some(path) if is_archive_name(candidate.extension) => {
                let entry_limit = config.max_upload_size_kb.map(|kb| kb.saturating_mul(1024));
                self.inspect_archive(path.to_path_buf(), config.max_zip_depth, entry_limit)
                    .await
            }
            _ => Ok(()),
        }
    }

    async fn inspect_archive(
        &self,
        path: PathBuf,
        max_depth: u32,
        entry_limit: Option<u64>,
    ) -> AppResult<()> {
        let inspector = self.inspector;
        let shown = path.display().to_string();
        let outcome =
            tokio::task::spawn_blocking(move || inspector.inspect(&path, max_depth, entry_limit))
                .await
                .map_err(|e| AppError::internal(format!("Archive inspection task failed: {e}")))?;

        match outcome {
            Ok(()) => Ok(()),
            Err(ArchiveError::DepthExceeded) => {
                Err(AppError::validation("nested archive depth exceeded"))
            }
            Err(ArchiveError::Invalid(reason)) => {
                debug!(path = %shown, reason = %reason, "Archive rejected as malformed");
                Err(AppError::validation("invalid archive"))
            }
            Err(ArchiveError::Io(e)) if self.archive_fail_closed => {
                warn!(path = %shown, error = %e, "Archive inspection failed, rejecting");
                Err(AppError::validation("archive could not be inspected"))
            }
            Err(ArchiveError::Io(e)) => {
                warn!(path = %shown, error = %e, "Archive inspection failed, allowing upload");
                Ok(())
            }
        }
    }
}
