//! Liveness check for the sensor feed
//!
//! On every tick the age of the current reading is compared against the
//! delay threshold. A stale reading raises the singleton `alerts/delayed`
//! document; repeated ticks while stale rewrite the same document. Clearing it
//! is the resolver's job.
//!
//! The read of the reading and the write of the alert are separate store
//! operations. Overlapping ticks, or a tick racing the resolver, can
//! interleave; the last write wins.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::time;

use super::Relay;
use crate::model::{Alert, Reading, DELAYED_ALERT_ID};
use crate::stats::RelayStats;
use crate::store::DocPath;

/// Result of one liveness check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LivenessOutcome {
    /// No current reading exists
    ReadingMissing,
    /// The reading could not be fetched or has no usable timestamp
    ReadFailed,
    /// The reading is recent enough
    Fresh,
    /// The delayed alert was written
    Raised,
    /// The delayed alert could not be written
    RaiseFailed,
}

impl Relay {
    /// Run one liveness check as of `now`
    pub async fn check_liveness(&self, now: DateTime<Utc>) -> LivenessOutcome {
        let reading_path = DocPath::current_reading();

        let doc = match self.store.get(&reading_path).await {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                tracing::error!(path = %reading_path, "No current reading to check");
                return LivenessOutcome::ReadingMissing;
            }
            Err(e) => {
                tracing::error!(path = %reading_path, error = %e, "Unable to read current reading");
                return LivenessOutcome::ReadFailed;
            }
        };

        let last_reading = match Reading::from_document(&doc) {
            Ok(reading) => reading.time,
            Err(e) => {
                tracing::error!(path = %reading_path, error = %e, "Current reading has no usable time");
                return LivenessOutcome::ReadFailed;
            }
        };

        let Some(threshold) = now.checked_sub_signed(self.settings.delay_threshold) else {
            tracing::warn!(
                threshold = %self.settings.delay_threshold,
                "Delay threshold reaches before the earliest representable time"
            );
            return LivenessOutcome::Fresh;
        };
        if last_reading > threshold {
            tracing::debug!(last_reading = %last_reading, "Readings are current");
            return LivenessOutcome::Fresh;
        }

        tracing::warn!(
            last_reading = %last_reading,
            threshold = %threshold,
            "Temperature updates delayed"
        );

        let alert_path = DocPath::alert(DELAYED_ALERT_ID);
        let written = match Alert::delayed(now).to_document() {
            Ok(doc) => self.store.set(&alert_path, doc).await.map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match written {
            Ok(()) => {
                tracing::info!(path = %alert_path, "Delay alert written");
                LivenessOutcome::Raised
            }
            Err(e) => {
                tracing::error!(path = %alert_path, error = %e, "Unable to write delay alert");
                LivenessOutcome::RaiseFailed
            }
        }
    }
}

/// Background worker running the liveness check on a fixed interval
pub struct LivenessWorker {
    relay: Arc<Relay>,
    stats: Arc<RelayStats>,
    interval: Duration,
    running: Arc<AtomicBool>,
    shutdown: watch::Sender<bool>,
}

impl LivenessWorker {
    pub fn new(relay: Arc<Relay>, stats: Arc<RelayStats>, interval: Duration) -> Self {
        Self {
            relay,
            stats,
            interval,
            running: Arc::new(AtomicBool::new(false)),
            shutdown: watch::channel(false).0,
        }
    }

    /// Start the background worker
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        self.running.store(true, Ordering::SeqCst);
        let mut shutdown_rx = self.shutdown.subscribe();

        tokio::spawn(async move {
            tracing::info!("Liveness worker started with interval {:?}", self.interval);

            let mut interval = time::interval(self.interval);

            while !*shutdown_rx.borrow() {
                tokio::select! {
                    _ = interval.tick() => {
                        let outcome = self.relay.check_liveness(Utc::now()).await;
                        self.stats.record_liveness(&outcome);
                    }
                    _ = shutdown_rx.changed() => {}
                }
            }

            self.running.store(false, Ordering::SeqCst);
            tracing::info!("Liveness worker stopped");
        })
    }

    /// Stop the worker, interrupting any wait for the next tick
    pub fn stop(&self) {
        self.shutdown.send_replace(true);
    }

    /// Check if worker is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
