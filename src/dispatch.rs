//! Routes store changes to the relay functions
//!
//! Every matching function runs as its own task, so a slow push send never
//! holds up the reading fan-out and rapid writes are handled concurrently.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::functions::Relay;
use crate::stats::RelayStats;
use crate::store::{DocPath, DocumentChange, ALERTS};

/// Subscribes to the change feed and spawns the functions each change triggers
pub struct Dispatcher {
    relay: Arc<Relay>,
    stats: Arc<RelayStats>,
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl Dispatcher {
    pub fn new(relay: Arc<Relay>, stats: Arc<RelayStats>) -> Self {
        Self {
            relay,
            stats,
            shutdown_tx: None,
        }
    }

    /// Start consuming `changes` in the background
    pub fn start(&mut self, mut changes: broadcast::Receiver<DocumentChange>) -> JoinHandle<()> {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        self.shutdown_tx = Some(shutdown_tx);

        let relay = Arc::clone(&self.relay);
        let stats = Arc::clone(&self.stats);

        tokio::spawn(async move {
            tracing::info!("Dispatcher started");

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        tracing::info!("Dispatcher shutting down");
                        break;
                    }
                    result = changes.recv() => {
                        match result {
                            Ok(change) => {
                                Self::dispatch(&relay, &stats, change);
                            }
                            Err(broadcast::error::RecvError::Lagged(missed)) => {
                                tracing::warn!(missed, "Dispatcher lagging, changes dropped");
                                stats.record_dropped(missed);
                            }
                            Err(broadcast::error::RecvError::Closed) => {
                                tracing::info!("Change feed closed");
                                break;
                            }
                        }
                    }
                }
            }
        })
    }

    /// Stop the background consumer
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
    }

    /// Spawn every function triggered by `change`
    pub fn dispatch(
        relay: &Arc<Relay>,
        stats: &Arc<RelayStats>,
        change: DocumentChange,
    ) -> Vec<JoinHandle<()>> {
        stats.record_change();
        let mut tasks = Vec::new();

        if change.path.collection == ALERTS {
            let relay = Arc::clone(relay);
            let stats = Arc::clone(stats);
            tasks.push(tokio::spawn(async move {
                let outcome = relay.publish_alert(&change).await;
                tracing::debug!(path = %change.path, ?outcome, "Alert publisher finished");
                stats.record_alert(&outcome);
            }));
        } else if change.path == DocPath::current_reading() {
            {
                let relay = Arc::clone(relay);
                let stats = Arc::clone(stats);
                let change = change.clone();
                tasks.push(tokio::spawn(async move {
                    let outcome = relay.publish_reading(&change).await;
                    tracing::debug!(?outcome, "Reading publisher finished");
                    stats.record_reading(&outcome);
                }));
            }

            let relay = Arc::clone(relay);
            let stats = Arc::clone(stats);
            tasks.push(tokio::spawn(async move {
                let outcome = relay.resolve_delay(Utc::now()).await;
                tracing::debug!(?outcome, "Delay resolver finished");
                stats.record_resolve(&outcome);
            }));
        }

        tasks
    }
}
