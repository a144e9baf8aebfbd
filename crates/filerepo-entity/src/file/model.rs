//! File record entity model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

const FILE_ID_PREFIX: &str = "CF_FR_";

/// Opaque, globally unique file identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct FileId(String);

impl FileId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(format!("{FILE_ID_PREFIX}{}", Uuid::new_v4().simple()))
    }

    /// Wrap an identifier received from a caller.
    pub fn parse(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for FileId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// A stored file's metadata record.
///
/// Identity, ownership, location and content facts are fixed at creation.
/// Only the tag and metadata can change afterwards, and each change
/// refreshes `modified_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FileRecord {
    file_id: FileId,
    tenant_id: Uuid,
    file_name: String,
    storage_path: String,
    media_type: String,
    size_bytes: i64,
    tag: Option<String>,
    metadata: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

/// Data required to create a new file record.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    /// Pre-generated identifier; the storage path already embeds it.
    pub file_id: FileId,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Sanitized original file name.
    pub file_name: String,
    /// Path of the committed file on disk.
    pub storage_path: String,
    /// Effective MIME type after content sniffing.
    pub media_type: String,
    /// Exact number of bytes written.
    pub size_bytes: u64,
    /// Optional caller-supplied tag.
    pub tag: Option<String>,
    /// Optional caller-supplied metadata object.
    pub metadata: Option<serde_json::Value>,
}

impl FileRecord {
    /// Create a record with `created_at == modified_at == now`.
    pub fn new(new: NewFileRecord) -> Self {
        let now = Utc::now();
        Self {
            file_id: new.file_id,
            tenant_id: new.tenant_id,
            file_name: new.file_name,
            storage_path: new.storage_path,
            media_type: new.media_type,
            size_bytes: i64::try_from(new.size_bytes).unwrap_or(i64::MAX),
            tag: new.tag,
            metadata: new.metadata,
            created_at: now,
            modified_at: now,
        }
    }

    pub fn file_id(&self) -> &FileId {
        &self.file_id
    }

    pub fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn storage_path(&self) -> &str {
        &self.storage_path
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Stored size in bytes.
    pub fn size_bytes(&self) -> u64 {
        u64::try_from(self.size_bytes).unwrap_or(0)
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn metadata(&self) -> Option<&serde_json::Value> {
        self.metadata.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    /// Replace the tag.
    pub fn set_tag(&mut self, tag: Option<String>) {
        self.tag = tag;
        self.touch();
    }

    /// Replace the metadata document.
    pub fn set_metadata(&mut self, metadata: Option<serde_json::Value>) {
        self.metadata = metadata;
        self.touch();
    }

    fn touch(&mut self) {
        // Clock skew must never move modified_at before created_at.
        self.modified_at = Utc::now().max(self.created_at);
    }
}
