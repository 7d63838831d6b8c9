//! JSON snapshots of the document store, for restarts

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{DocPath, MemoryStore};

const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoreSnapshot {
    schema_version: u32,
    /// Creation timestamp (epoch ms)
    created_at: i64,
    /// Documents keyed by `collection/id`
    documents: BTreeMap<String, serde_json::Value>,
}

/// Write every document in `store` to `path`.
///
/// The file is written next to its destination first and then renamed over
/// it, so a crash mid-write leaves the previous snapshot intact.
pub fn save_snapshot(store: &MemoryStore, path: &Path) -> Result<usize, SnapshotError> {
    let documents: BTreeMap<String, serde_json::Value> = store
        .documents()
        .into_iter()
        .map(|(path, doc)| (path.to_string(), doc))
        .collect();
    let count = documents.len();

    let snapshot = StoreSnapshot {
        schema_version: SCHEMA_VERSION,
        created_at: chrono::Utc::now().timestamp_millis(),
        documents,
    };
    let data = serde_json::to_vec_pretty(&snapshot)?;

    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, data)?;
    std::fs::rename(&tmp, path)?;

    tracing::info!(path = %path.display(), documents = count, "Store snapshot written");
    Ok(count)
}

/// Build a store from the snapshot at `path`. A missing file yields an empty store.
pub fn load_snapshot(path: &Path) -> Result<MemoryStore, SnapshotError> {
    let store = MemoryStore::new();

    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "No store snapshot found, starting empty");
            return Ok(store);
        }
        Err(e) => return Err(e.into()),
    };

    let snapshot: StoreSnapshot = serde_json::from_slice(&data)?;
    if snapshot.schema_version != SCHEMA_VERSION {
        return Err(SnapshotError::UnsupportedVersion(snapshot.schema_version));
    }

    for (key, doc) in snapshot.documents {
        let doc_path = DocPath::parse(&key).ok_or_else(|| SnapshotError::InvalidPath(key.clone()))?;
        store.restore(doc_path, doc);
    }

    tracing::info!(path = %path.display(), documents = store.len(), "Store snapshot restored");
    Ok(store)
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported snapshot version: {0}")]
    UnsupportedVersion(u32),

    #[error("Invalid document path in snapshot: {0}")]
    InvalidPath(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DocumentStore;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        let store = MemoryStore::new();
        store
            .set(&DocPath::alert("delayed"), json!({"active": true}))
            .await
            .unwrap();
        store
            .set(&DocPath::current_reading(), json!({"celsius": 3.5}))
            .await
            .unwrap();

        assert_eq!(save_snapshot(&store, &path).unwrap(), 2);

        let restored = load_snapshot(&path).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(
            restored.get(&DocPath::alert("delayed")).await.unwrap(),
            Some(json!({"active": true}))
        );
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = load_snapshot(&dir.path().join("absent.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_rejects_unknown_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(
            &path,
            r#"{"schema_version": 99, "created_at": 0, "documents": {}}"#,
        )
        .unwrap();

        assert!(matches!(
            load_snapshot(&path),
            Err(SnapshotError::UnsupportedVersion(99))
        ));
    }
}
