use serde::{Deserialize, Serialize};

/// Event types delivered by the inbound webhook transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebhookEvent {
    #[serde(rename = "lead.created")]
    LeadCreated,
    #[serde(rename = "lead.updated")]
    LeadUpdated,
    #[serde(rename = "quote.accepted")]
    QuoteAccepted,
    #[serde(rename = "quote.declined")]
    QuoteDeclined,
    #[serde(rename = "conversation.completed")]
    ConversationCompleted,
}

impl WebhookEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeadCreated => "lead.created",
            Self::LeadUpdated => "lead.updated",
            Self::QuoteAccepted => "quote.accepted",
            Self::QuoteDeclined => "quote.declined",
            Self::ConversationCompleted => "conversation.completed",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub event: WebhookEvent,
    pub data: serde_json::Value,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookResponse {
    pub fn ok(event: WebhookEvent) -> Self {
        Self { success: true, message: None, event: Some(event.as_str().to_string()), error: None }
    }

    pub fn failed(event: WebhookEvent, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            event: Some(event.as_str().to_string()),
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{WebhookEvent, WebhookPayload};

    #[test]
    fn payload_parses_dotted_event_names() {
        let payload: WebhookPayload = serde_json::from_str(
            r#"{"event":"lead.created","data":{"id":"lead-1"},"timestamp":"2026-03-01T00:00:00Z"}"#,
        )
        .expect("payload should parse");

        assert_eq!(payload.event, WebhookEvent::LeadCreated);
        assert_eq!(payload.data["id"], "lead-1");
        assert_eq!(payload.timestamp.as_deref(), Some("2026-03-01T00:00:00Z"));
    }

    #[test]
    fn unknown_event_is_rejected() {
        let result =
            serde_json::from_str::<WebhookPayload>(r#"{"event":"lead.deleted","data":{}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn timestamp_is_optional() {
        let payload: WebhookPayload =
            serde_json::from_str(r#"{"event":"quote.accepted","data":{}}"#)
                .expect("payload should parse");
        assert_eq!(payload.timestamp, None);
    }
}
