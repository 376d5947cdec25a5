//! Identifier record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uidvault_id::{Category, Prefix, Scheme};

/// Scheme-specific extra data stored alongside a record.
///
/// Only timestamp identifiers carry metadata today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Prefix used to build a timestamp identifier.
    pub prefix: Prefix,
}

/// A persisted identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentifierRecord {
    /// The identifier itself. Primary key.
    pub id: String,
    /// Scheme that produced the identifier.
    pub scheme: Scheme,
    /// Insertion time.
    pub created_at: DateTime<Utc>,
    /// Caller-supplied tag.
    pub category: Option<Category>,
    /// Extra data, present only for prefixed timestamp identifiers.
    pub metadata: Option<RecordMetadata>,
}

impl IdentifierRecord {
    /// Creates a record without metadata.
    pub fn new(
        id: impl Into<String>,
        scheme: Scheme,
        created_at: DateTime<Utc>,
        category: Option<Category>,
    ) -> Self {
        Self {
            id: id.into(),
            scheme,
            created_at,
            category,
            metadata: None,
        }
    }

    /// Attaches metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: RecordMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Returns true if the metadata is allowed for the record's scheme.
    pub fn is_consistent(&self) -> bool {
        self.metadata.is_none() || self.scheme.accepts_prefix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix_metadata() -> RecordMetadata {
        RecordMetadata {
            prefix: Prefix::new("ab1").unwrap(),
        }
    }

    #[test]
    fn test_metadata_json_shape() {
        let json = serde_json::to_string(&prefix_metadata()).unwrap();
        assert_eq!(json, r#"{"prefix":"AB1"}"#);
    }

    #[test]
    fn test_metadata_rejects_invalid_prefix() {
        let result: Result<RecordMetadata, _> = serde_json::from_str(r#"{"prefix":"a-b"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_consistency() {
        let now = Utc::now();
        let plain = IdentifierRecord::new("x", Scheme::V4, now, None);
        assert!(plain.is_consistent());

        let stamped = IdentifierRecord::new("AB1-1", Scheme::Timestamp, now, None)
            .with_metadata(prefix_metadata());
        assert!(stamped.is_consistent());

        let wrong = IdentifierRecord::new("y", Scheme::V1, now, None).with_metadata(prefix_metadata());
        assert!(!wrong.is_consistent());
    }
}
