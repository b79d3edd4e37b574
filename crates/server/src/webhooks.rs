//! Inbound webhook endpoints and event orchestration.
//!
//! Every endpoint verifies the raw-body HMAC signature (when a secret is
//! configured), parses the `{event, data, timestamp}` envelope, then
//! dispatches. Handler failures are reported as `{success: false}` with
//! HTTP 200; only authentication and payload parsing fail the request.

use std::sync::Arc;

use anyhow::{bail, Context as _};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use tracing::{error, info, warn};
use uuid::Uuid;

use leadflow_agent::LeadProcessor;
use leadflow_core::domain::lead::{Lead, LeadStatus};
use leadflow_core::domain::quote::{QuoteId, QuoteStatus};
use leadflow_core::domain::webhook::{WebhookEvent, WebhookPayload, WebhookResponse};
use leadflow_core::quotes::QuoteDraft;
use leadflow_core::scoring::{LeadQuality, ScoreThresholds};
use leadflow_core::security::verify_signature;
use leadflow_db::{ConversationRepository, LeadRepository, QuoteRepository};
use leadflow_email::EmailService;
use leadflow_slack::{
    new_qualified_lead_message, quote_accepted_message, quote_declined_message,
    NewLeadNotification, NotificationSender,
};

pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<LeadProcessor>,
    pub leads: Arc<dyn LeadRepository>,
    pub quotes: Arc<dyn QuoteRepository>,
    pub conversations: Arc<dyn ConversationRepository>,
    pub email: Arc<EmailService>,
    pub notifier: Arc<dyn NotificationSender>,
    pub webhook_secret: Option<SecretString>,
    pub thresholds: ScoreThresholds,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/webhooks/lead", post(handle_lead_webhook))
        .route("/webhooks/quote", post(handle_quote_webhook))
        .route("/webhooks/conversation", post(handle_conversation_webhook))
        .with_state(state)
}

async fn handle_lead_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let payload = match authenticate_and_parse(&state, &headers, &body) {
        Ok(payload) => payload,
        Err(rejection) => return rejection,
    };

    info!(
        event_name = "webhook.received",
        endpoint = "lead",
        event = payload.event.as_str(),
        "lead webhook received"
    );

    let response = match payload.event {
        WebhookEvent::LeadCreated => run_handler(&payload, handle_lead_created(&state, &payload)).await,
        WebhookEvent::LeadUpdated => {
            info!(
                event_name = "webhook.lead_updated",
                lead_id = payload.data.get("id").and_then(|value| value.as_str()).unwrap_or("unknown"),
                "lead updated"
            );
            WebhookResponse::ok(payload.event)
        }
        other => unknown_event(other),
    };

    (StatusCode::OK, Json(response)).into_response()
}

async fn handle_quote_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let payload = match authenticate_and_parse(&state, &headers, &body) {
        Ok(payload) => payload,
        Err(rejection) => return rejection,
    };

    info!(
        event_name = "webhook.received",
        endpoint = "quote",
        event = payload.event.as_str(),
        "quote webhook received"
    );

    let response = match payload.event {
        WebhookEvent::QuoteAccepted => {
            run_handler(&payload, handle_quote_decision(&state, &payload, QuoteStatus::Accepted))
                .await
        }
        WebhookEvent::QuoteDeclined => {
            run_handler(&payload, handle_quote_decision(&state, &payload, QuoteStatus::Declined))
                .await
        }
        other => unknown_event(other),
    };

    (StatusCode::OK, Json(response)).into_response()
}

async fn handle_conversation_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let payload = match authenticate_and_parse(&state, &headers, &body) {
        Ok(payload) => payload,
        Err(rejection) => return rejection,
    };

    info!(
        event_name = "webhook.received",
        endpoint = "conversation",
        event = payload.event.as_str(),
        "conversation webhook received"
    );

    let response = match payload.event {
        WebhookEvent::ConversationCompleted => {
            run_handler(&payload, handle_conversation_completed(&state, &payload)).await
        }
        other => unknown_event(other),
    };

    (StatusCode::OK, Json(response)).into_response()
}

fn authenticate_and_parse(
    state: &AppState,
    headers: &HeaderMap,
    body: &str,
) -> Result<WebhookPayload, Response> {
    if let Some(secret) = &state.webhook_secret {
        let signature =
            headers.get(SIGNATURE_HEADER).and_then(|value| value.to_str().ok());
        if !verify_signature(body, signature, secret.expose_secret()) {
            warn!(event_name = "webhook.invalid_signature", "invalid webhook signature");
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"detail": "Invalid signature"})),
            )
                .into_response());
        }
    }

    serde_json::from_str::<WebhookPayload>(body).map_err(|parse_error| {
        error!(
            event_name = "webhook.invalid_payload",
            error = %parse_error,
            "invalid webhook payload"
        );
        (StatusCode::BAD_REQUEST, Json(serde_json::json!({"detail": "Invalid payload"})))
            .into_response()
    })
}

async fn run_handler(
    payload: &WebhookPayload,
    handler: impl std::future::Future<Output = anyhow::Result<()>>,
) -> WebhookResponse {
    match handler.await {
        Ok(()) => WebhookResponse::ok(payload.event),
        Err(handler_error) => {
            error!(
                event_name = "webhook.processing_failed",
                event = payload.event.as_str(),
                error = %handler_error,
                "webhook processing failed"
            );
            WebhookResponse::failed(payload.event, handler_error.to_string())
        }
    }
}

fn unknown_event(event: WebhookEvent) -> WebhookResponse {
    warn!(
        event_name = "webhook.unexpected_event",
        event = event.as_str(),
        "event type not handled by this endpoint"
    );
    WebhookResponse::ok(event)
}

/// New lead: score, route, welcome the lead, and for high quality notify
/// the team and draft a quote.
async fn handle_lead_created(state: &AppState, payload: &WebhookPayload) -> anyhow::Result<()> {
    let lead = Lead::from_event_data(&payload.data, Utc::now())?;
    info!(event_name = "lead.created", lead_id = %lead.id.0, "processing new lead");

    let (score, workflow) = state.processor.process(&lead).await;
    let quality = score.quality_with(&state.thresholds);
    info!(
        event_name = "lead.scored",
        lead_id = %lead.id.0,
        score = score.total,
        quality = quality.as_str(),
        "lead scored"
    );

    if let (Some(email), Some(name)) = (&lead.email, &lead.name) {
        state
            .email
            .send_welcome(email, name, lead.automation_area.as_deref(), lead.problem_text.as_deref())
            .await;
    }

    if quality == LeadQuality::High {
        let notification = NewLeadNotification {
            lead_name: lead.name.clone().unwrap_or_else(|| "Unknown".to_string()),
            lead_email: lead.email.clone().unwrap_or_default(),
            company: lead.company.clone(),
            score: score.total,
            quality,
            automation_area: lead.automation_area.clone(),
            crm_url: None,
        };
        state.notifier.send(&new_qualified_lead_message(&notification)).await;

        state
            .email
            .send_team_notification(
                lead.name.as_deref().unwrap_or("Unknown"),
                lead.email.as_deref().unwrap_or(""),
                lead.company.as_deref(),
                lead.problem_text.as_deref(),
                Some(score.total),
            )
            .await;

        if lead.is_qualified() {
            draft_quote_for(state, &lead).await;
        }
    }

    info!(
        event_name = "lead.processing_complete",
        lead_id = %lead.id.0,
        workflow = workflow.as_str(),
        "lead processing complete"
    );
    Ok(())
}

/// Quote persistence is best-effort here: the webhook already succeeded
/// from the caller's point of view.
async fn draft_quote_for(state: &AppState, lead: &Lead) {
    let draft = QuoteDraft::for_lead(lead);
    let quote_id = QuoteId(format!("qt-{}", Uuid::new_v4()));

    let quote = match draft.into_quote(quote_id, lead, Utc::now()) {
        Ok(quote) => quote,
        Err(draft_error) => {
            error!(
                event_name = "quote.draft_failed",
                lead_id = %lead.id.0,
                error = %draft_error,
                "failed to draft quote"
            );
            return;
        }
    };

    match state.quotes.insert(&quote).await {
        Ok(()) => {
            info!(
                event_name = "quote.generated",
                lead_id = %lead.id.0,
                quote_id = %quote.id.0,
                total = %quote.totals.total_amount,
                "quote generated for qualified lead"
            );
        }
        Err(persist_error) => {
            error!(
                event_name = "quote.persist_failed",
                lead_id = %lead.id.0,
                quote_id = %quote.id.0,
                error = %persist_error,
                "failed to persist generated quote"
            );
        }
    }
}

/// Quote accepted or declined: update quote and lead state, notify the team.
async fn handle_quote_decision(
    state: &AppState,
    payload: &WebhookPayload,
    decision: QuoteStatus,
) -> anyhow::Result<()> {
    let quote_id = payload
        .data
        .get("quote_id")
        .and_then(|value| value.as_str())
        .filter(|value| !value.is_empty());
    let Some(quote_id) = quote_id else {
        bail!("quote payload is missing required field `quote_id`");
    };
    let quote_id = QuoteId(quote_id.to_string());
    let reason = payload.data.get("reason").and_then(|value| value.as_str());

    let quote_with_lead = state
        .quotes
        .find_with_lead(&quote_id)
        .await
        .context("failed to load quote")?;
    let Some(quote_with_lead) = quote_with_lead else {
        error!(
            event_name = "quote.not_found",
            quote_id = %quote_id.0,
            "quote not found for decision webhook"
        );
        return Ok(());
    };

    if let Err(update_error) = state.quotes.update_status(&quote_id, decision, reason).await {
        error!(
            event_name = "quote.status_update_failed",
            quote_id = %quote_id.0,
            error = %update_error,
            "failed to update quote status"
        );
    }

    let lead_status = match decision {
        QuoteStatus::Accepted => LeadStatus::Converted,
        _ => LeadStatus::Nurture,
    };
    if let Err(update_error) =
        state.leads.update_status(&quote_with_lead.quote.lead_id, lead_status).await
    {
        error!(
            event_name = "lead.status_update_failed",
            lead_id = %quote_with_lead.quote.lead_id.0,
            error = %update_error,
            "failed to update lead status"
        );
    }

    let lead_name = quote_with_lead.lead_name.as_deref().unwrap_or("Unknown");
    let message = match decision {
        QuoteStatus::Accepted => quote_accepted_message(
            lead_name,
            quote_with_lead.lead_company.as_deref(),
            &quote_with_lead.quote.project_title,
            quote_with_lead.quote.totals.total_amount,
        ),
        _ => quote_declined_message(
            lead_name,
            quote_with_lead.lead_company.as_deref(),
            &quote_with_lead.quote.project_title,
            reason,
        ),
    };
    state.notifier.send(&message).await;

    info!(
        event_name = "quote.decision_processed",
        quote_id = %quote_id.0,
        decision = decision.as_str(),
        "quote decision processed"
    );
    Ok(())
}

async fn handle_conversation_completed(
    state: &AppState,
    payload: &WebhookPayload,
) -> anyhow::Result<()> {
    let conversation_id = payload
        .data
        .get("conversation_id")
        .and_then(|value| value.as_str())
        .filter(|value| !value.is_empty());
    let Some(conversation_id) = conversation_id else {
        bail!("conversation payload is missing required field `conversation_id`");
    };

    if let Err(update_error) = state.conversations.mark_completed(conversation_id).await {
        error!(
            event_name = "conversation.update_failed",
            conversation_id,
            error = %update_error,
            "failed to mark conversation completed"
        );
        return Ok(());
    }

    info!(
        event_name = "conversation.completed",
        conversation_id,
        "conversation completed"
    );
    Ok(())
}
