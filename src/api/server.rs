use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    add_document, check_liveness, delete_document, get_document, health_check, list_documents,
    put_document, stats, AppState,
};
use crate::config::RelayConfig;
use crate::dispatch::Dispatcher;
use crate::functions::{LivenessWorker, Relay};
use crate::messaging::{HttpMessenger, LogMessenger, MemoryQueue, PushMessenger, QueuePublisher};
use crate::stats::RelayStats;
use crate::store::{load_snapshot, save_snapshot, MemoryStore};

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Documents
        .route(
            "/documents/:collection",
            get(list_documents).post(add_document),
        )
        .route(
            "/documents/:collection/:id",
            get(get_document).put(put_document).delete(delete_document),
        )
        // Liveness
        .route("/liveness/check", post(check_liveness))
        // Stats
        .route("/stats", get(stats))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

fn build_messenger(config: &RelayConfig) -> Arc<dyn PushMessenger> {
    match &config.push_url {
        Some(url) => {
            tracing::info!("Push notifications via {}", url);
            Arc::new(HttpMessenger::new(url.clone(), config.push_token.clone()))
        }
        None => {
            tracing::info!("No push endpoint configured, notifications are logged only");
            Arc::new(LogMessenger::new())
        }
    }
}

#[cfg(feature = "kafka")]
fn build_publisher(config: &RelayConfig) -> Result<Arc<dyn QueuePublisher>, Box<dyn std::error::Error>> {
    use crate::messaging::{KafkaConfig, KafkaPublisher};

    if let Some(kafka_config) = KafkaConfig::from_env() {
        return Ok(Arc::new(KafkaPublisher::new(&kafka_config)?));
    }
    Ok(Arc::new(MemoryQueue::with_topics(vec![
        config.settings.reading_topic.clone(),
    ])))
}

#[cfg(not(feature = "kafka"))]
fn build_publisher(config: &RelayConfig) -> Result<Arc<dyn QueuePublisher>, Box<dyn std::error::Error>> {
    tracing::info!("Readings are queued in memory");
    Ok(Arc::new(MemoryQueue::with_topics(vec![
        config.settings.reading_topic.clone(),
    ])))
}

/// Run the relay: dispatcher, liveness worker and HTTP server
pub async fn run_server(config: RelayConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Collaborators are created once and shared by every invocation
    let store = Arc::new(match &config.snapshot_path {
        Some(path) => load_snapshot(path)?,
        None => MemoryStore::new(),
    });
    let relay = Arc::new(Relay::new(
        store.clone(),
        build_messenger(&config),
        build_publisher(&config)?,
        config.settings.clone(),
    ));
    let stats = Arc::new(RelayStats::default());

    // Start background workers
    let mut dispatcher = Dispatcher::new(Arc::clone(&relay), Arc::clone(&stats));
    let dispatcher_handle = dispatcher.start(store.subscribe());

    let liveness_worker = Arc::new(LivenessWorker::new(
        Arc::clone(&relay),
        Arc::clone(&stats),
        Duration::from_secs(config.liveness_interval_secs),
    ));
    let liveness_handle = Arc::clone(&liveness_worker).start();

    let state = Arc::new(AppState {
        store: Arc::clone(&store),
        relay,
        stats,
    });
    let app = build_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("Starting hedgerelay on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(Arc::clone(&liveness_worker)))
        .await?;

    // Stop workers
    if let Err(e) = liveness_handle.await {
        tracing::warn!(error = %e, "Liveness worker did not stop cleanly");
    }
    dispatcher.stop().await;
    if let Err(e) = dispatcher_handle.await {
        tracing::warn!(error = %e, "Dispatcher did not stop cleanly");
    }

    if let Some(path) = &config.snapshot_path {
        save_snapshot(&store, path)?;
    }

    tracing::info!("hedgerelay stopped");
    Ok(())
}

async fn shutdown_signal(liveness_worker: Arc<LivenessWorker>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Unable to listen for shutdown signal");
    }

    tracing::info!("Shutdown signal received, stopping workers...");
    liveness_worker.stop();
}
