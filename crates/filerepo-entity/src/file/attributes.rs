//! Mutable file attributes (tag and metadata).

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Caller-supplied tag and metadata, used at ingest and on update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct FileAttributes {
    /// Short label: ASCII letters, digits and underscores.
    #[validate(length(min = 1, max = 64), custom(function = "validate_tag"))]
    pub tag: Option<String>,
    /// Free-form JSON object.
    pub metadata: Option<serde_json::Value>,
}

impl FileAttributes {
    /// Run the derived tag checks plus the metadata shape.
    pub fn check(&self) -> Result<(), String> {
        self.validate().map_err(|e| format!("Invalid file attributes: {e}"))?;
        if let Some(metadata) = &self.metadata
            && !metadata.is_object()
        {
            return Err("Metadata must be a JSON object".to_string());
        }
        Ok(())
    }
}

/// Tags start with a letter or digit and continue with letters, digits or
/// underscores. Length is checked by the derive.
pub fn validate_tag(tag: &str) -> Result<(), ValidationError> {
    let mut chars = tag.chars();
    let valid_head = chars.next().is_some_and(|c| c.is_ascii_alphanumeric());
    let valid_tail = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid_head && valid_tail {
        Ok(())
    } else {
        let mut err = ValidationError::new("tag_pattern");
        err.message = Some("Tag may only contain letters, digits and underscores".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tag_pattern() {
        assert!(validate_tag("invoice_2026").is_ok());
        assert!(validate_tag("A").is_ok());
        assert!(validate_tag("_leading").is_err());
        assert!(validate_tag("has space").is_err());
        assert!(validate_tag("dash-ed").is_err());
    }

    #[test]
    fn test_tag_length_and_pattern_checked_by_validate() {
        let with_tag = |tag: String| FileAttributes {
            tag: Some(tag),
            metadata: None,
        };
        assert!(with_tag("a".repeat(64)).validate().is_ok());
        assert!(with_tag("a".repeat(65)).validate().is_err());

        let err = with_tag("bad tag".into()).validate().unwrap_err();
        assert!(err.field_errors().contains_key("tag"));
        assert!(with_tag("bad tag".into()).check().unwrap_err().contains("letters, digits"));
    }

    #[test]
    fn test_metadata_must_be_object() {
        let attrs = FileAttributes {
            tag: None,
            metadata: Some(json!([1, 2])),
        };
        assert!(attrs.check().is_err());

        let attrs = FileAttributes {
            tag: Some("ok".into()),
            metadata: Some(json!({"k": "v"})),
        };
        assert!(attrs.check().is_ok());
    }

    #[test]
    fn test_empty_tag_rejected() {
        let attrs = FileAttributes {
            tag: Some(String::new()),
            metadata: None,
        };
        assert!(attrs.check().is_err());
    }
}
