//! Alert documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Document id reserved for the synthetic liveness alert.
pub const DELAYED_ALERT_ID: &str = "delayed";

/// Message written into the synthetic liveness alert.
pub const DELAY_WARNING: &str = "Temperature updates delayed! Check power/network.";

/// An operational warning, live or archived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Whether the alert is currently firing
    pub active: bool,
    /// Human-readable text, used as the notification title
    pub message: String,
    /// When the alert started
    pub start: DateTime<Utc>,
    /// When the alert was resolved (archived alerts only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

impl Alert {
    /// Create a new active alert
    pub fn active(message: impl Into<String>, start: DateTime<Utc>) -> Self {
        Self {
            active: true,
            message: message.into(),
            start,
            end: None,
        }
    }

    /// The liveness alert raised when readings stop arriving
    pub fn delayed(now: DateTime<Utc>) -> Self {
        Self::active(DELAY_WARNING, now)
    }

    /// Copy of this alert closed at `end`, suitable for the history
    pub fn resolved(&self, end: DateTime<Utc>) -> Self {
        Self {
            active: false,
            message: self.message.clone(),
            start: self.start,
            end: Some(end),
        }
    }

    pub fn from_document(doc: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Alert::deserialize(doc)
    }

    pub fn to_document(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
