//! Ingest request parameters.

use std::fmt;

use filerepo_core::types::ByteStream;
use filerepo_entity::file::FileAttributes;

/// One upload: declared name, optional content type and attributes, and
/// the content stream.
pub struct IngestRequest {
    /// Filename as declared by the caller, before sanitization.
    pub file_name: String,
    /// Content type declared by the caller, if any.
    pub content_type: Option<String>,
    /// Optional tag and metadata to store with the file.
    pub attributes: FileAttributes,
    /// The file content.
    pub stream: ByteStream,
}

impl IngestRequest {
    pub fn new(file_name: impl Into<String>, stream: ByteStream) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            attributes: FileAttributes::default(),
            stream,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.attributes.tag = Some(tag.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.attributes.metadata = Some(metadata);
        self
    }
}

impl fmt::Debug for IngestRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestRequest")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}
