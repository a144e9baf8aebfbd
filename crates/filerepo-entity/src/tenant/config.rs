//! Per-tenant ingestion configuration.
//!
//! Stored documents may use legacy key names and mixed-case list entries.
//! Deserialization always goes through [`RawTenantConfig`] so that every
//! `TenantConfig` value observed by the rest of the system is normalized:
//! extensions are lowercase with a single leading dot, MIME types are lowercase,
//! and a zero size limit means "no limit".

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Validated, normalized tenant configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTenantConfig")]
pub struct TenantConfig {
    /// Maximum upload size in KiB (None = unlimited).
    pub max_upload_size_kb: Option<u64>,
    /// Extensions accepted for upload. Empty rejects every extension.
    pub allowed_extensions: BTreeSet<String>,
    /// Extensions always rejected, checked before the allow-list.
    pub forbidden_extensions: BTreeSet<String>,
    /// MIME types accepted for upload. Empty rejects every type.
    pub allowed_mime_types: BTreeSet<String>,
    /// MIME types always rejected, checked before the allow-list.
    pub forbidden_mime_types: BTreeSet<String>,
    /// Maximum zip nesting depth. Zero forbids any nested archive.
    pub max_zip_depth: u32,
    /// Aggregate storage quota in bytes (None = unlimited).
    pub storage_quota_bytes: Option<u64>,
    /// Maximum number of stored files (None = unlimited).
    pub file_count_limit: Option<u64>,
}

/// Wire form of a tenant configuration document.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTenantConfig {
    #[serde(alias = "max_file_size_kbytes")]
    max_upload_size_kb: Option<u64>,
    allowed_extensions: Vec<String>,
    forbidden_extensions: Vec<String>,
    allowed_mime_types: Vec<String>,
    forbidden_mime_types: Vec<String>,
    #[serde(alias = "zip_nesting_limit")]
    max_zip_depth: u32,
    storage_quota_bytes: Option<u64>,
    file_count_limit: Option<u64>,
}

impl From<RawTenantConfig> for TenantConfig {
    fn from(raw: RawTenantConfig) -> Self {
        Self {
            max_upload_size_kb: raw.max_upload_size_kb.filter(|kb| *kb > 0),
            allowed_extensions: normalize_extensions(raw.allowed_extensions),
            forbidden_extensions: normalize_extensions(raw.forbidden_extensions),
            allowed_mime_types: normalize_mime_types(raw.allowed_mime_types),
            forbidden_mime_types: normalize_mime_types(raw.forbidden_mime_types),
            max_zip_depth: raw.max_zip_depth,
            storage_quota_bytes: raw.storage_quota_bytes,
            file_count_limit: raw.file_count_limit,
        }
    }
}

/// Normalize a single extension to `.ext` form. Blank input yields `""`.
pub fn normalize_extension(ext: &str) -> String {
    let bare = ext.trim().trim_start_matches('.');
    if bare.is_empty() {
        String::new()
    } else {
        format!(".{}", bare.to_lowercase())
    }
}

fn normalize_extensions(items: Vec<String>) -> BTreeSet<String> {
    items
        .iter()
        .map(|e| normalize_extension(e))
        .filter(|e| !e.is_empty())
        .collect()
}

fn normalize_mime_types(items: Vec<String>) -> BTreeSet<String> {
    items
        .iter()
        .map(|m| m.trim().to_lowercase())
        .filter(|m| !m.is_empty())
        .collect()
}

impl TenantConfig {
    /// Parse a stored JSON configuration document.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Whether an extension (already normalized) is on the forbidden list.
    pub fn forbids_extension(&self, ext: &str) -> bool {
        self.forbidden_extensions.contains(ext)
    }

    /// Whether an extension (already normalized) is on the allow-list.
    pub fn allows_extension(&self, ext: &str) -> bool {
        self.allowed_extensions.contains(ext)
    }

    /// Whether a MIME type (already lowercase) is on the forbidden list.
    pub fn forbids_mime_type(&self, mime: &str) -> bool {
        self.forbidden_mime_types.contains(mime)
    }

    /// Whether a MIME type (already lowercase) is on the allow-list.
    pub fn allows_mime_type(&self, mime: &str) -> bool {
        self.allowed_mime_types.contains(mime)
    }
}
