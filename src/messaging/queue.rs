//! In-process message queue

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{PublishError, QueuePublisher};

/// Upper bound on retained messages; older ones are dropped first
const DEFAULT_RETAIN: usize = 1000;

/// A message accepted by [`MemoryQueue`]
#[derive(Debug, Clone)]
pub struct QueuedMessage {
    pub id: String,
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Queue that keeps recently published messages in memory.
///
/// Used when no external broker is configured. When constructed with a topic
/// list, publishing to any other topic fails.
pub struct MemoryQueue {
    topics: Option<Vec<String>>,
    retain: usize,
    state: RwLock<QueueState>,
}

#[derive(Default)]
struct QueueState {
    next_id: u64,
    messages: Vec<QueuedMessage>,
}

impl MemoryQueue {
    /// Queue accepting any topic
    pub fn new() -> Self {
        Self {
            topics: None,
            retain: DEFAULT_RETAIN,
            state: RwLock::new(QueueState::default()),
        }
    }

    /// Queue accepting only the given topics
    pub fn with_topics(topics: Vec<String>) -> Self {
        Self {
            topics: Some(topics),
            ..Self::new()
        }
    }

    pub fn with_retain(mut self, retain: usize) -> Self {
        self.retain = retain.max(1);
        self
    }

    /// Retained messages for a topic, oldest first
    pub fn messages(&self, topic: &str) -> Vec<QueuedMessage> {
        self.state
            .read()
            .messages
            .iter()
            .filter(|m| m.topic == topic)
            .cloned()
            .collect()
    }

    /// Total messages ever accepted
    pub fn published(&self) -> u64 {
        self.state.read().next_id
    }
}

impl Default for MemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueuePublisher for MemoryQueue {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<String, PublishError> {
        if let Some(topics) = &self.topics {
            if !topics.iter().any(|t| t == topic) {
                return Err(PublishError::UnknownTopic(topic.to_string()));
            }
        }

        let mut state = self.state.write();
        state.next_id += 1;
        let id = state.next_id.to_string();

        state.messages.push(QueuedMessage {
            id: id.clone(),
            topic: topic.to_string(),
            payload,
        });
        if state.messages.len() > self.retain {
            let overflow = state.messages.len() - self.retain;
            state.messages.drain(..overflow);
        }

        Ok(id)
    }
}
