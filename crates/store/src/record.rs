//! Persisted record format for an annotation collection

use crate::Result;
use annotations::Annotation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix of every storage key; the full key is stable for a given document
/// identity across reloads
pub const STORAGE_KEY_PREFIX: &str = "ai-tracker-post-";

/// Build the storage key for a document identity
pub fn storage_key(identity: &str) -> String {
    format!("{STORAGE_KEY_PREFIX}{identity}")
}

/// The collection as written to storage, keyed by `storage_key(post_id)`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRecord {
    /// Document identity the collection belongs to
    pub post_id: String,
    /// URL the document was open at when last saved
    pub url: String,
    /// The annotation collection, in insertion order
    pub annotations: Vec<Annotation>,
    /// When the record was last written
    pub last_updated: DateTime<Utc>,
}

impl PersistedRecord {
    /// Create a record stamped with the current time
    pub fn new(post_id: impl Into<String>, url: impl Into<String>, annotations: Vec<Annotation>) -> Self {
        Self {
            post_id: post_id.into(),
            url: url.into(),
            annotations,
            last_updated: Utc::now(),
        }
    }

    /// Serialize to the stored JSON form
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from the stored JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
