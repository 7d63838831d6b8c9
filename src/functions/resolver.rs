//! Resolution of the delayed-reading alert
//!
//! Archiving the alert and clearing the singleton are two independent store
//! calls. Either can fail without the other being undone, so the archive may
//! hold an entry whose marker is still live, or the marker may be gone with no
//! archive entry. Both outcomes are logged.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Relay;
use crate::model::{Alert, DELAYED_ALERT_ID};
use crate::store::{DocPath, ALERTS};

/// Result of one resolver run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResolveOutcome {
    /// No delayed alert exists
    NothingToResolve,
    /// The delayed alert could not be read
    LookupFailed,
    /// The marker existed and its delete was attempted
    Resolved {
        /// Id of the history entry, if archiving succeeded
        archived_id: Option<String>,
        /// Whether the singleton was deleted
        cleared: bool,
    },
}

impl Relay {
    /// Close out the delayed alert after a new reading arrived at `now`
    pub async fn resolve_delay(&self, now: DateTime<Utc>) -> ResolveOutcome {
        let path = DocPath::alert(DELAYED_ALERT_ID);

        let doc = match self.store.get(&path).await {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                tracing::debug!(path = %path, "No delay alert to resolve");
                return ResolveOutcome::NothingToResolve;
            }
            Err(e) => {
                tracing::error!(path = %path, error = %e, "Unable to read delay alert");
                return ResolveOutcome::LookupFailed;
            }
        };

        // An unreadable marker is not archived, but it is still cleared
        let entry =
            Alert::from_document(&doc).and_then(|delayed| delayed.resolved(now).to_document());
        let archived_id = match entry {
            Ok(entry) => match self.store.add(ALERTS, entry).await {
                Ok(id) => {
                    tracing::info!(alert_id = %id, "Delay alert archived");
                    Some(id)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Unable to archive delay alert");
                    None
                }
            },
            Err(e) => {
                tracing::error!(path = %path, error = %e, "Unreadable delay alert, not archived");
                None
            }
        };

        let cleared = match self.store.delete(&path).await {
            Ok(()) => {
                tracing::info!(path = %path, "Delay alert cleared");
                true
            }
            Err(e) => {
                tracing::error!(path = %path, error = %e, "Unable to clear delay alert");
                false
            }
        };

        ResolveOutcome::Resolved {
            archived_id,
            cleared,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::RelaySettings;
    use crate::messaging::MemoryQueue;
    use crate::store::DocumentStore;
    use crate::testing::{FlakyStore, RecordingMessenger};
    use chrono::TimeZone;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 5, h, m, 0).unwrap()
    }

    fn relay(store: Arc<FlakyStore>) -> Relay {
        Relay::new(
            store,
            Arc::new(RecordingMessenger::default()),
            Arc::new(MemoryQueue::new()),
            RelaySettings::default(),
        )
    }

    async fn store_with_delay(message: &str, start: DateTime<Utc>) -> Arc<FlakyStore> {
        let store = Arc::new(FlakyStore::default());
        let doc = Alert::active(message, start).to_document().unwrap();
        store
            .inner
            .set(&DocPath::alert(DELAYED_ALERT_ID), doc)
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_nothing_to_resolve() {
        let store = Arc::new(FlakyStore::default());

        let outcome = relay(store.clone()).resolve_delay(at(13, 0)).await;

        assert_eq!(outcome, ResolveOutcome::NothingToResolve);
        assert_eq!(store.adds.load(Ordering::SeqCst), 0);
        assert_eq!(store.deletes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_archives_and_clears() {
        let store = store_with_delay("Sensor quiet", at(12, 25)).await;

        let outcome = relay(store.clone()).resolve_delay(at(13, 0)).await;

        let ResolveOutcome::Resolved { archived_id: Some(id), cleared: true } = outcome.clone() else {
            panic!("unexpected outcome: {:?}", outcome);
        };
        assert!(store.inner.get(&DocPath::alert(DELAYED_ALERT_ID)).await.unwrap().is_none());

        let archived = store.inner.get(&DocPath::alert(id)).await.unwrap().unwrap();
        let archived = Alert::from_document(&archived).unwrap();
        assert_eq!(
            archived,
            Alert {
                active: false,
                message: "Sensor quiet".to_string(),
                start: at(12, 25),
                end: Some(at(13, 0)),
            }
        );
        assert_eq!(store.adds.load(Ordering::SeqCst), 1);
        assert_eq!(store.deletes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_archive_failure_still_clears() {
        let store = store_with_delay("Sensor quiet", at(12, 25)).await;
        store.fail_add.store(true, Ordering::SeqCst);

        let outcome = relay(store.clone()).resolve_delay(at(13, 0)).await;

        assert_eq!(
            outcome,
            ResolveOutcome::Resolved { archived_id: None, cleared: true }
        );
        assert_eq!(store.deletes.load(Ordering::SeqCst), 1);
        assert!(store.inner.is_empty());
    }

    #[tokio::test]
    async fn test_clear_failure_still_archives() {
        let store = store_with_delay("Sensor quiet", at(12, 25)).await;
        store.fail_delete.store(true, Ordering::SeqCst);

        let outcome = relay(store.clone()).resolve_delay(at(13, 0)).await;

        assert!(matches!(
            outcome,
            ResolveOutcome::Resolved { archived_id: Some(_), cleared: false }
        ));
        assert_eq!(store.adds.load(Ordering::SeqCst), 1);
        // Marker and archive entry both present
        assert_eq!(store.inner.list("alerts").len(), 2);
    }

    #[tokio::test]
    async fn test_unreadable_marker_is_still_cleared() {
        let store = Arc::new(FlakyStore::default());
        store
            .inner
            .set(
                &DocPath::alert(DELAYED_ALERT_ID),
                serde_json::json!({"active": true, "message": "m"}),
            )
            .await
            .unwrap();

        let outcome = relay(store.clone()).resolve_delay(at(13, 0)).await;

        assert_eq!(
            outcome,
            ResolveOutcome::Resolved { archived_id: None, cleared: true }
        );
        assert_eq!(store.adds.load(Ordering::SeqCst), 0);
        assert_eq!(store.deletes.load(Ordering::SeqCst), 1);
        assert!(store.inner.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_failure() {
        let store = store_with_delay("Sensor quiet", at(12, 25)).await;
        store.fail_get.store(true, Ordering::SeqCst);

        let outcome = relay(store.clone()).resolve_delay(at(13, 0)).await;

        assert_eq!(outcome, ResolveOutcome::LookupFailed);
        assert_eq!(store.adds.load(Ordering::SeqCst), 0);
        assert_eq!(store.deletes.load(Ordering::SeqCst), 0);
    }
}
