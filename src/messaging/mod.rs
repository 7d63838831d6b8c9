//! Outbound messaging: push notifications and queue publishing

pub mod push;
pub mod queue;

#[cfg(feature = "kafka")]
pub mod kafka;

pub use push::{HttpMessenger, LogMessenger};
pub use queue::{MemoryQueue, QueuedMessage};

#[cfg(feature = "kafka")]
pub use kafka::{KafkaConfig, KafkaPublisher};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Title and body shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// A push notification addressed to a topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    pub notification: Notification,
    pub topic: String,
}

/// Sends push notifications
#[async_trait]
pub trait PushMessenger: Send + Sync {
    /// Send a message, returning the provider's message id.
    /// With `dry_run` the provider validates the message without delivering it.
    async fn send(&self, message: &PushMessage, dry_run: bool) -> Result<String, MessengerError>;
}

/// Publishes payloads to a message queue
#[async_trait]
pub trait QueuePublisher: Send + Sync {
    /// Publish `payload` to `topic`, returning the transport's message id
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<String, PublishError>;
}

/// Push messenger errors
#[derive(Debug, thiserror::Error)]
pub enum MessengerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Push service returned status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Push service response missing message name")]
    MissingMessageId,
}

/// Queue publish errors
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Unknown topic: {0}")]
    UnknownTopic(String),

    #[error("Transport error: {0}")]
    Transport(String),
}
