//! hedgerelay server
//!
//! Run with: cargo run
//!
//! See `hedgerelay::config` for the `HEDGE_*` environment variables.
//! `RUST_LOG` sets the log level (default: info). With the `kafka` feature,
//! `KAFKA_BROKERS` switches reading fan-out from the in-memory queue to Kafka.

use hedgerelay::api::run_server;
use hedgerelay::RelayConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hedgerelay=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RelayConfig::from_env()?;

    tracing::info!("hedgerelay configuration:");
    tracing::info!("  Host: {}:{}", config.host, config.port);
    tracing::info!(
        "  Liveness check interval: {} seconds",
        config.liveness_interval_secs
    );
    tracing::info!(
        "  Delay threshold: {} seconds",
        config.settings.delay_threshold.num_seconds()
    );
    tracing::info!("  Timezone: {}", config.settings.timezone);
    tracing::info!("  Alert topic: {}", config.settings.alert_topic);
    tracing::info!("  Reading topic: {}", config.settings.reading_topic);
    if config.settings.dry_run {
        tracing::info!("  Push dry run: ENABLED");
    }
    match &config.snapshot_path {
        Some(path) => tracing::info!("  Snapshot: {}", path.display()),
        None => tracing::info!("  Snapshot: DISABLED"),
    }

    run_server(config).await
}
