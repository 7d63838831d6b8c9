//! Relay functions
//!
//! Each function maps one trigger (a document change or a liveness tick) to
//! calls on the relay's collaborators and reports what it did as an outcome
//! value. Downstream failures are logged and folded into the outcome; nothing
//! is retried.

pub mod alert_publisher;
pub mod formatter;
pub mod liveness;
pub mod reading_publisher;
pub mod resolver;

pub use alert_publisher::AlertOutcome;
pub use formatter::{format_alert, format_start};
pub use liveness::{LivenessOutcome, LivenessWorker};
pub use reading_publisher::ReadingOutcome;
pub use resolver::ResolveOutcome;

use std::sync::Arc;

use chrono_tz::Tz;

use crate::messaging::{PushMessenger, QueuePublisher};
use crate::store::DocumentStore;

/// Fixed parameters of the relay functions
#[derive(Debug, Clone)]
pub struct RelaySettings {
    /// Push topic receiving alert notifications
    pub alert_topic: String,
    /// Queue topic receiving serialized readings
    pub reading_topic: String,
    /// Timezone used to render alert start times
    pub timezone: Tz,
    /// Age after which the current reading counts as delayed
    pub delay_threshold: chrono::Duration,
    /// Ask the push service to validate without delivering
    pub dry_run: bool,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            alert_topic: "alerts".to_string(),
            reading_topic: "temperatures".to_string(),
            timezone: chrono_tz::America::Vancouver,
            delay_threshold: chrono::Duration::minutes(20),
            dry_run: false,
        }
    }
}

/// Shared collaborators, built once at startup
pub struct Relay {
    pub store: Arc<dyn DocumentStore>,
    pub messenger: Arc<dyn PushMessenger>,
    pub publisher: Arc<dyn QueuePublisher>,
    pub settings: RelaySettings,
}

impl Relay {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        messenger: Arc<dyn PushMessenger>,
        publisher: Arc<dyn QueuePublisher>,
        settings: RelaySettings,
    ) -> Self {
        Self {
            store,
            messenger,
            publisher,
            settings,
        }
    }
}
