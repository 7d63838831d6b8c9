//! Push notifications for newly active alerts

use serde::Serialize;

use super::{format_alert, Relay};
use crate::model::Alert;
use crate::store::DocumentChange;

/// Which branch the alert publisher took
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AlertOutcome {
    /// The alert document was deleted
    Deleted,
    /// The alert is not active
    Inactive,
    /// The document could not be read as an alert
    Invalid,
    /// A notification was sent
    Sent { message_id: String },
    /// The send was attempted and failed
    SendFailed,
}

impl Relay {
    /// Handle a write to an alert document
    pub async fn publish_alert(&self, change: &DocumentChange) -> AlertOutcome {
        let Some(doc) = &change.after else {
            return AlertOutcome::Deleted;
        };

        // Only active alerts need the rest of the document
        let active = doc
            .get("active")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        if !active {
            return AlertOutcome::Inactive;
        }

        let alert = match Alert::from_document(doc) {
            Ok(alert) => alert,
            Err(e) => {
                tracing::error!(path = %change.path, error = %e, "Unreadable alert document");
                return AlertOutcome::Invalid;
            }
        };

        let message = format_alert(&alert, self.settings.timezone, &self.settings.alert_topic);
        tracing::info!(alert_id = %change.path.id, "New alert with message: {}", alert.message);

        match self.messenger.send(&message, self.settings.dry_run).await {
            Ok(message_id) => {
                tracing::info!(
                    alert_id = %change.path.id,
                    message_id = %message_id,
                    "Message sent for alert: {}",
                    alert.message
                );
                AlertOutcome::Sent { message_id }
            }
            Err(e) => {
                tracing::error!(alert_id = %change.path.id, error = %e, "Unable to send alert");
                AlertOutcome::SendFailed
            }
        }
    }
}
