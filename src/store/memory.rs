//! In-memory document store

use async_trait::async_trait;
use dashmap::DashMap;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tokio::sync::broadcast;

use super::{DocPath, DocumentChange, DocumentStore, StoreError};

/// Length of generated document ids
const AUTO_ID_LEN: usize = 20;

/// Capacity of the change feed before slow subscribers start lagging
const CHANGE_FEED_CAPACITY: usize = 1024;

/// Document store kept in memory, publishing every write on a change feed
pub struct MemoryStore {
    docs: DashMap<DocPath, serde_json::Value>,
    changes: broadcast::Sender<DocumentChange>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            docs: DashMap::new(),
            changes,
        }
    }

    /// Subscribe to the change feed. Only writes after this call are seen.
    pub fn subscribe(&self) -> broadcast::Receiver<DocumentChange> {
        self.changes.subscribe()
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Copy of every document, for snapshots
    pub fn documents(&self) -> Vec<(DocPath, serde_json::Value)> {
        self.docs
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }

    /// Ids of all documents in a collection
    pub fn list(&self, collection: &str) -> Vec<String> {
        let mut ids: Vec<String> = self
            .docs
            .iter()
            .filter(|e| e.key().collection == collection)
            .map(|e| e.key().id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Insert without emitting a change, used when restoring a snapshot
    pub(crate) fn restore(&self, path: DocPath, doc: serde_json::Value) {
        self.docs.insert(path, doc);
    }

    fn publish(&self, path: DocPath, before: Option<serde_json::Value>, after: Option<serde_json::Value>) {
        // No subscribers is fine; nothing is listening yet.
        let _ = self.changes.send(DocumentChange { path, before, after });
    }

    fn generate_id() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(AUTO_ID_LEN)
            .map(char::from)
            .collect()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &DocPath) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(self.docs.get(path).map(|d| d.value().clone()))
    }

    async fn set(&self, path: &DocPath, doc: serde_json::Value) -> Result<(), StoreError> {
        if !doc.is_object() {
            return Err(StoreError::NotAnObject(path.clone()));
        }

        let before = self.docs.insert(path.clone(), doc.clone());
        tracing::debug!(path = %path, "Document written");
        self.publish(path.clone(), before, Some(doc));
        Ok(())
    }

    async fn add(&self, collection: &str, doc: serde_json::Value) -> Result<String, StoreError> {
        if collection.is_empty() || collection.contains('/') {
            return Err(StoreError::InvalidCollection(collection.to_string()));
        }

        let id = Self::generate_id();
        let path = DocPath::new(collection, id.clone());
        self.set(&path, doc).await?;
        Ok(id)
    }

    async fn delete(&self, path: &DocPath) -> Result<(), StoreError> {
        if let Some((_, before)) = self.docs.remove(path) {
            tracing::debug!(path = %path, "Document deleted");
            self.publish(path.clone(), Some(before), None);
        }
        Ok(())
    }
}
