//! hedgerelay: alert and reading relay for a remote temperature sensor
//!
//! Watches a document store for alert and reading changes and forwards them:
//!
//! - **Alert publisher**: newly active alerts become push notifications
//! - **Reading publisher**: every current-reading write is published to a queue
//! - **Liveness monitor**: a periodic check raises the `alerts/delayed`
//!   singleton when readings stop arriving
//! - **Delay resolver**: the next reading archives and clears that singleton
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use hedgerelay::functions::{Relay, RelaySettings};
//! use hedgerelay::messaging::{LogMessenger, MemoryQueue};
//! use hedgerelay::store::MemoryStore;
//!
//! # async fn run() {
//! let store = Arc::new(MemoryStore::new());
//! let relay = Relay::new(
//!     store.clone(),
//!     Arc::new(LogMessenger::new()),
//!     Arc::new(MemoryQueue::new()),
//!     RelaySettings::default(),
//! );
//!
//! let outcome = relay.check_liveness(chrono::Utc::now()).await;
//! println!("Liveness: {:?}", outcome);
//! # }
//! ```

pub mod api;
pub mod config;
pub mod dispatch;
pub mod functions;
pub mod messaging;
pub mod model;
pub mod stats;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::{ConfigError, RelayConfig};
pub use functions::{AlertOutcome, LivenessOutcome, ReadingOutcome, Relay, RelaySettings, ResolveOutcome};
pub use model::{Alert, Reading};
pub use store::{DocPath, DocumentStore, MemoryStore, StoreError};
