//! Outbound email delivery (Resend-style HTTP API).

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{error, info, warn};

const RESEND_API_URL: &str = "https://api.resend.com/emails";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub reply_to: Option<String>,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Returns true when the email was accepted for delivery. Failures are
    /// logged, never propagated.
    async fn send(&self, email: OutboundEmail) -> bool;
}

pub struct ResendSender {
    client: reqwest::Client,
    api_url: String,
    api_key: SecretString,
    from_email: String,
}

impl ResendSender {
    pub fn new(api_key: SecretString, from_email: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: RESEND_API_URL.to_string(),
            api_key,
            from_email,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

#[derive(Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[async_trait]
impl EmailSender for ResendSender {
    async fn send(&self, email: OutboundEmail) -> bool {
        let request = ResendRequest {
            from: &self.from_email,
            to: [email.to.as_str()],
            subject: &email.subject,
            html: &email.html,
            reply_to: email.reply_to.as_deref(),
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                info!(
                    event_name = "email.sent",
                    to = %email.to,
                    subject = %email.subject,
                    "email sent"
                );
                true
            }
            Ok(response) => {
                error!(
                    event_name = "email.rejected",
                    to = %email.to,
                    subject = %email.subject,
                    status = %response.status(),
                    "email provider rejected message"
                );
                false
            }
            Err(request_error) => {
                error!(
                    event_name = "email.send_failed",
                    to = %email.to,
                    subject = %email.subject,
                    error = %request_error,
                    "failed to send email"
                );
                false
            }
        }
    }
}

/// Stand-in used when no email API key is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopEmailSender;

#[async_trait]
impl EmailSender for NoopEmailSender {
    async fn send(&self, email: OutboundEmail) -> bool {
        warn!(
            event_name = "email.unconfigured",
            to = %email.to,
            subject = %email.subject,
            "email not configured, skipping send"
        );
        false
    }
}
