//! Kafka producer for reading fan-out
//!
//! ## Configuration
//!
//! Environment variables:
//! - `KAFKA_BROKERS`: Comma-separated list of brokers (enables Kafka when set)
//! - `KAFKA_CLIENT_ID`: Producer client id (default: hedgerelay)
//! - `KAFKA_MESSAGE_TIMEOUT_MS`: Delivery timeout in ms (default: 5000)

use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;

use super::{PublishError, QueuePublisher};

/// Kafka producer configuration
#[derive(Debug, Clone)]
pub struct KafkaConfig {
    /// Kafka broker addresses
    pub brokers: String,
    /// Producer client id
    pub client_id: String,
    /// How long to wait for delivery before giving up
    pub message_timeout_ms: u32,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            client_id: "hedgerelay".to_string(),
            message_timeout_ms: 5000,
        }
    }
}

impl KafkaConfig {
    /// Create config from environment variables, `None` when no brokers are set
    pub fn from_env() -> Option<Self> {
        let brokers = std::env::var("KAFKA_BROKERS").ok()?;
        if brokers.trim().is_empty() {
            return None;
        }

        Some(Self {
            brokers,
            client_id: std::env::var("KAFKA_CLIENT_ID")
                .unwrap_or_else(|_| "hedgerelay".to_string()),
            message_timeout_ms: std::env::var("KAFKA_MESSAGE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
        })
    }
}

/// Queue publisher backed by a Kafka producer
pub struct KafkaPublisher {
    producer: FutureProducer,
    timeout: Duration,
}

impl KafkaPublisher {
    pub fn new(config: &KafkaConfig) -> Result<Self, KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("client.id", &config.client_id)
            .set("message.timeout.ms", config.message_timeout_ms.to_string())
            .create()?;

        tracing::info!(brokers = %config.brokers, "Kafka producer created");

        Ok(Self {
            producer,
            timeout: Duration::from_millis(config.message_timeout_ms as u64),
        })
    }
}

#[async_trait]
impl QueuePublisher for KafkaPublisher {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<String, PublishError> {
        let record: FutureRecord<'_, (), [u8]> = FutureRecord::to(topic).payload(payload.as_slice());

        match self.producer.send(record, Timeout::After(self.timeout)).await {
            Ok((partition, offset)) => Ok(format!("{}:{}:{}", topic, partition, offset)),
            Err((e, _)) => Err(PublishError::Transport(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kafka_config_default() {
        let config = KafkaConfig::default();
        assert_eq!(config.brokers, "localhost:9092");
        assert_eq!(config.client_id, "hedgerelay");
        assert_eq!(config.message_timeout_ms, 5000);
    }
}
