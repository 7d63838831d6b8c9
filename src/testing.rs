//! Collaborator fakes shared by unit tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::messaging::{MessengerError, PublishError, PushMessage, PushMessenger, QueuePublisher};
use crate::store::{DocPath, DocumentStore, MemoryStore, StoreError};

/// Messenger recording every send attempt
#[derive(Default)]
pub struct RecordingMessenger {
    pub sent: Mutex<Vec<(PushMessage, bool)>>,
    pub fail: AtomicBool,
}

impl RecordingMessenger {
    pub fn failing() -> Self {
        let messenger = Self::default();
        messenger.fail.store(true, Ordering::SeqCst);
        messenger
    }

    pub fn attempts(&self) -> Vec<(PushMessage, bool)> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl PushMessenger for RecordingMessenger {
    async fn send(&self, message: &PushMessage, dry_run: bool) -> Result<String, MessengerError> {
        let mut sent = self.sent.lock();
        sent.push((message.clone(), dry_run));
        if self.fail.load(Ordering::SeqCst) {
            return Err(MessengerError::MissingMessageId);
        }
        Ok(format!("msg-{}", sent.len()))
    }
}

/// Publisher recording every attempt and always failing
#[derive(Default)]
pub struct FailingQueue {
    pub attempts: AtomicUsize,
}

#[async_trait]
impl QueuePublisher for FailingQueue {
    async fn publish(&self, _topic: &str, _payload: Vec<u8>) -> Result<String, PublishError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(PublishError::Transport("broker down".to_string()))
    }
}

/// Store wrapper with switchable failures and call counters
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_get: AtomicBool,
    pub fail_set: AtomicBool,
    pub fail_add: AtomicBool,
    pub fail_delete: AtomicBool,
    pub adds: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl FlakyStore {
    fn check(flag: &AtomicBool) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("injected failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get(&self, path: &DocPath) -> Result<Option<serde_json::Value>, StoreError> {
        Self::check(&self.fail_get)?;
        self.inner.get(path).await
    }

    async fn set(&self, path: &DocPath, doc: serde_json::Value) -> Result<(), StoreError> {
        Self::check(&self.fail_set)?;
        self.inner.set(path, doc).await
    }

    async fn add(&self, collection: &str, doc: serde_json::Value) -> Result<String, StoreError> {
        self.adds.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_add)?;
        self.inner.add(collection, doc).await
    }

    async fn delete(&self, path: &DocPath) -> Result<(), StoreError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_delete)?;
        self.inner.delete(path).await
    }
}
