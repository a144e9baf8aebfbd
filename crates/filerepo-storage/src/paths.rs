//! Storage path derivation.

use chrono::{DateTime, Utc};

use filerepo_core::error::AppError;
use filerepo_core::result::AppResult;

/// Relative storage path for a new file: `{tenant_code}/{YYYY-MM}/{file_id}{ext}`.
///
/// `ext` is either empty or a normalized `.ext`. The tenant code becomes a
/// directory name, so it must be a single safe path segment.
pub fn relative_storage_path(
    tenant_code: &str,
    file_id: &str,
    ext: &str,
    now: DateTime<Utc>,
) -> AppResult<String> {
    if !is_safe_segment(tenant_code) {
        return Err(AppError::internal(format!(
            "Tenant code is not a safe path segment: {tenant_code:?}"
        )));
    }
    if !is_safe_segment(file_id) || ext.contains(['/', '\\']) {
        return Err(AppError::internal("File identifier is not path-safe"));
    }
    Ok(format!(
        "{tenant_code}/{}/{file_id}{ext}",
        now.format("%Y-%m")
    ))
}

fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
