//! Fire-and-forget delivery to a Slack incoming webhook.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::blocks::{Block, MessageTemplate};

#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Returns true when the message was delivered. Failures are logged,
    /// never propagated.
    async fn send(&self, message: &MessageTemplate) -> bool;
}

#[derive(Serialize)]
struct WebhookBody<'a> {
    text: &'a str,
    blocks: &'a [Block],
    #[serde(skip_serializing_if = "Option::is_none")]
    channel: Option<&'a str>,
}

pub struct SlackWebhookSender {
    client: reqwest::Client,
    webhook_url: SecretString,
    channel: Option<String>,
}

impl SlackWebhookSender {
    pub fn new(webhook_url: SecretString, channel: Option<String>) -> Self {
        Self { client: reqwest::Client::new(), webhook_url, channel }
    }
}

#[async_trait]
impl NotificationSender for SlackWebhookSender {
    async fn send(&self, message: &MessageTemplate) -> bool {
        let body = WebhookBody {
            text: &message.fallback_text,
            blocks: &message.blocks,
            channel: self.channel.as_deref(),
        };

        let response =
            self.client.post(self.webhook_url.expose_secret()).json(&body).send().await;

        match response {
            Ok(response) if response.status().is_success() => {
                info!(
                    event_name = "slack.notification_sent",
                    preview = %truncate(&message.fallback_text, 50),
                    "slack notification sent"
                );
                true
            }
            Ok(response) => {
                error!(
                    event_name = "slack.notification_rejected",
                    status = %response.status(),
                    "slack webhook rejected notification"
                );
                false
            }
            Err(request_error) => {
                error!(
                    event_name = "slack.notification_failed",
                    error = %request_error,
                    "slack notification failed"
                );
                false
            }
        }
    }
}

/// Stand-in used when no webhook URL is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotificationSender;

#[async_trait]
impl NotificationSender for NoopNotificationSender {
    async fn send(&self, _message: &MessageTemplate) -> bool {
        warn!(
            event_name = "slack.unconfigured",
            "slack not configured, skipping notification"
        );
        false
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
