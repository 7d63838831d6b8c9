//! Queue fan-out for sensor readings

use serde::Serialize;

use super::Relay;
use crate::store::DocumentChange;

/// Which branch the reading publisher took
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReadingOutcome {
    /// The reading document was deleted
    Deleted,
    /// The reading was published
    Published { message_id: String },
    /// The publish was attempted and failed
    PublishFailed,
}

impl Relay {
    /// Handle a write to the current-reading document
    pub async fn publish_reading(&self, change: &DocumentChange) -> ReadingOutcome {
        let Some(doc) = &change.after else {
            return ReadingOutcome::Deleted;
        };

        let payload = match serde_json::to_vec(doc) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(path = %change.path, error = %e, "Unable to serialize reading");
                return ReadingOutcome::PublishFailed;
            }
        };

        match self.publisher.publish(&self.settings.reading_topic, payload).await {
            Ok(message_id) => {
                tracing::info!(
                    topic = %self.settings.reading_topic,
                    message_id = %message_id,
                    "Reading published"
                );
                ReadingOutcome::Published { message_id }
            }
            Err(e) => {
                tracing::error!(
                    topic = %self.settings.reading_topic,
                    error = %e,
                    "Unable to publish reading"
                );
                ReadingOutcome::PublishFailed
            }
        }
    }
}
