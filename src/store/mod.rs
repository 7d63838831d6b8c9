//! Document store
//!
//! Documents are JSON objects addressed by `collection/id`. Every write made
//! through [`MemoryStore`] is broadcast as a [`DocumentChange`] carrying the
//! before/after snapshots, which is what drives the relay functions.

pub mod memory;
pub mod snapshot;

pub use memory::MemoryStore;
pub use snapshot::{load_snapshot, save_snapshot, SnapshotError};

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Collection holding live and archived alerts
pub const ALERTS: &str = "alerts";
/// Collection holding the current sensor reading
pub const READINGS: &str = "readings";
/// Document id of the current sensor reading
pub const CURRENT_READING_ID: &str = "current";

/// Address of a single document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocPath {
    pub collection: String,
    pub id: String,
}

impl DocPath {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }

    pub fn alert(id: impl Into<String>) -> Self {
        Self::new(ALERTS, id)
    }

    pub fn current_reading() -> Self {
        Self::new(READINGS, CURRENT_READING_ID)
    }

    /// Parse `collection/id`
    pub fn parse(path: &str) -> Option<Self> {
        let (collection, id) = path.split_once('/')?;
        if collection.is_empty() || id.is_empty() || id.contains('/') {
            return None;
        }
        Some(Self::new(collection, id))
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// A single write observed on the store
#[derive(Debug, Clone)]
pub struct DocumentChange {
    pub path: DocPath,
    pub before: Option<serde_json::Value>,
    pub after: Option<serde_json::Value>,
}

/// Read/write access to documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document, `None` if it does not exist
    async fn get(&self, path: &DocPath) -> Result<Option<serde_json::Value>, StoreError>;

    /// Create or overwrite a document
    async fn set(&self, path: &DocPath, doc: serde_json::Value) -> Result<(), StoreError>;

    /// Insert a document under a generated id, returning the id
    async fn add(&self, collection: &str, doc: serde_json::Value) -> Result<String, StoreError>;

    /// Delete a document. Deleting a missing document is not an error.
    async fn delete(&self, path: &DocPath) -> Result<(), StoreError>;
}

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Document at {0} is not a JSON object")]
    NotAnObject(DocPath),

    #[error("Invalid collection name: {0}")]
    InvalidCollection(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_path() {
        assert_eq!(DocPath::parse("alerts/delayed"), Some(DocPath::alert("delayed")));
        assert_eq!(DocPath::parse("alerts"), None);
        assert_eq!(DocPath::parse("alerts/"), None);
        assert_eq!(DocPath::parse("a/b/c"), None);
    }
}
