//! Push notification transports

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{MessengerError, PushMessage, PushMessenger};

/// Messenger that only logs, used when no push endpoint is configured
#[derive(Default)]
pub struct LogMessenger {
    sent: AtomicU64,
}

impl LogMessenger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PushMessenger for LogMessenger {
    async fn send(&self, message: &PushMessage, dry_run: bool) -> Result<String, MessengerError> {
        let seq = self.sent.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::warn!(
            topic = %message.topic,
            dry_run,
            "Push notification: {} - {}",
            message.notification.title,
            message.notification.body
        );
        Ok(format!("log/{}", seq))
    }
}

/// Messenger posting to an HTTP push endpoint.
///
/// The request body is `{"validate_only": dry_run, "message": {...}}` and the
/// response must carry the message id in its `name` field.
pub struct HttpMessenger {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl HttpMessenger {
    pub fn new(url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            token,
        }
    }
}

#[async_trait]
impl PushMessenger for HttpMessenger {
    async fn send(&self, message: &PushMessage, dry_run: bool) -> Result<String, MessengerError> {
        let payload = serde_json::json!({
            "validate_only": dry_run,
            "message": message,
        });

        let mut request = self.client.post(&self.url).json(&payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MessengerError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response.json().await?;
        let name = body
            .get("name")
            .and_then(|n| n.as_str())
            .ok_or(MessengerError::MissingMessageId)?;

        tracing::debug!(url = %self.url, message_id = %name, "Push request accepted");
        Ok(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::Notification;

    #[tokio::test]
    async fn test_log_messenger_numbers_messages() {
        let messenger = LogMessenger::new();
        let message = PushMessage {
            notification: Notification {
                title: "t".to_string(),
                body: "b".to_string(),
            },
            topic: "alerts".to_string(),
        };

        assert_eq!(messenger.send(&message, false).await.unwrap(), "log/1");
        assert_eq!(messenger.send(&message, true).await.unwrap(), "log/2");
    }

    #[tokio::test]
    async fn test_http_messenger_unreachable() {
        // Port 9 (discard) on localhost is not expected to accept HTTP
        let messenger = HttpMessenger::new("http://127.0.0.1:9/send", None);
        let message = PushMessage {
            notification: Notification {
                title: "t".to_string(),
                body: "b".to_string(),
            },
            topic: "alerts".to_string(),
        };

        assert!(messenger.send(&message, true).await.is_err());
    }
}
