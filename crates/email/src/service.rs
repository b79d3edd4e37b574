//! High-level email flows for the lead pipeline.

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use crate::sender::{EmailSender, OutboundEmail};
use crate::templates::{EmailTemplates, QuoteReadyEmail, TeamNotificationEmail, WelcomeEmail};

pub struct EmailService {
    templates: EmailTemplates,
    sender: Arc<dyn EmailSender>,
    team_notification_email: Option<String>,
}

impl EmailService {
    pub fn new(sender: Arc<dyn EmailSender>, team_notification_email: Option<String>) -> Result<Self> {
        Ok(Self { templates: EmailTemplates::new()?, sender, team_notification_email })
    }

    pub async fn send_welcome(
        &self,
        to: &str,
        name: &str,
        automation_area: Option<&str>,
        problem_text: Option<&str>,
    ) -> bool {
        let html = match self
            .templates
            .render_welcome(&WelcomeEmail { name, automation_area, problem_text })
        {
            Ok(html) => html,
            Err(render_error) => {
                error!(
                    event_name = "email.render_failed",
                    template = "welcome",
                    error = %render_error,
                    "failed to render welcome email"
                );
                return false;
            }
        };

        self.sender
            .send(OutboundEmail {
                to: to.to_string(),
                subject: "🤖 Your Automation Project - Next Steps".to_string(),
                html,
                reply_to: None,
            })
            .await
    }

    pub async fn send_quote(
        &self,
        to: &str,
        name: &str,
        project_title: &str,
        quote_url: Option<&str>,
    ) -> bool {
        let html = match self
            .templates
            .render_quote_ready(&QuoteReadyEmail { name, project_title, quote_url })
        {
            Ok(html) => html,
            Err(render_error) => {
                error!(
                    event_name = "email.render_failed",
                    template = "quote_ready",
                    error = %render_error,
                    "failed to render quote email"
                );
                return false;
            }
        };

        self.sender
            .send(OutboundEmail {
                to: to.to_string(),
                subject: format!("📋 Your Quote: {project_title}"),
                html,
                reply_to: None,
            })
            .await
    }

    pub async fn send_team_notification(
        &self,
        lead_name: &str,
        lead_email: &str,
        company: Option<&str>,
        project_summary: Option<&str>,
        lead_score: Option<u8>,
    ) -> bool {
        let Some(team_email) = &self.team_notification_email else {
            info!(
                event_name = "email.team_notification_unconfigured",
                "team notification email not configured, skipping"
            );
            return false;
        };

        let html = match self.templates.render_team_notification(&TeamNotificationEmail {
            lead_name,
            lead_email,
            company,
            project_summary,
            lead_score,
        }) {
            Ok(html) => html,
            Err(render_error) => {
                error!(
                    event_name = "email.render_failed",
                    template = "team_notification",
                    error = %render_error,
                    "failed to render team notification email"
                );
                return false;
            }
        };

        self.sender
            .send(OutboundEmail {
                to: team_email.clone(),
                subject: format!(
                    "🎯 New Lead: {lead_name} from {}",
                    company.unwrap_or("Unknown")
                ),
                html,
                reply_to: None,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::sender::{EmailSender, OutboundEmail};

    use super::EmailService;

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<OutboundEmail>>,
    }

    #[async_trait]
    impl EmailSender for RecordingSender {
        async fn send(&self, email: OutboundEmail) -> bool {
            self.sent.lock().expect("sent lock").push(email);
            true
        }
    }

    #[tokio::test]
    async fn welcome_email_goes_to_the_lead() {
        let sender = Arc::new(RecordingSender::default());
        let service = EmailService::new(sender.clone(), None).expect("service builds");

        let delivered = service
            .send_welcome("ada@example.com", "Ada", Some("reporting"), None)
            .await;

        assert!(delivered);
        let sent = sender.sent.lock().expect("sent lock");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ada@example.com");
        assert!(sent[0].subject.contains("Next Steps"));
        assert!(sent[0].html.contains("Hi Ada,"));
    }

    #[tokio::test]
    async fn team_notification_requires_a_configured_recipient() {
        let sender = Arc::new(RecordingSender::default());
        let service = EmailService::new(sender.clone(), None).expect("service builds");

        let delivered = service
            .send_team_notification("Ada", "ada@example.com", None, None, Some(80))
            .await;

        assert!(!delivered);
        assert!(sender.sent.lock().expect("sent lock").is_empty());
    }

    #[tokio::test]
    async fn team_notification_goes_to_the_team_inbox() {
        let sender = Arc::new(RecordingSender::default());
        let service =
            EmailService::new(sender.clone(), Some("team@example.com".to_string()))
                .expect("service builds");

        let delivered = service
            .send_team_notification(
                "Ada",
                "ada@example.com",
                Some("Analytical Engines"),
                Some("Automate everything"),
                Some(91),
            )
            .await;

        assert!(delivered);
        let sent = sender.sent.lock().expect("sent lock");
        assert_eq!(sent[0].to, "team@example.com");
        assert!(sent[0].subject.contains("Analytical Engines"));
        assert!(sent[0].html.contains("91/100"));
    }

    #[tokio::test]
    async fn quote_email_names_the_project() {
        let sender = Arc::new(RecordingSender::default());
        let service = EmailService::new(sender.clone(), None).expect("service builds");

        let delivered = service
            .send_quote("ada@example.com", "Ada", "Workflow Automation", None)
            .await;

        assert!(delivered);
        let sent = sender.sent.lock().expect("sent lock");
        assert_eq!(sent[0].subject, "📋 Your Quote: Workflow Automation");
    }
}
