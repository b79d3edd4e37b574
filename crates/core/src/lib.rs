pub mod config;
pub mod domain;
pub mod errors;
pub mod quotes;
pub mod routing;
pub mod scoring;
pub mod security;

pub use chrono;

pub use domain::lead::{Lead, LeadId, LeadStatus};
pub use domain::quote::{BillingUnit, Quote, QuoteId, QuoteStatus, QuoteTotals, ScopeItem};
pub use domain::webhook::{WebhookEvent, WebhookPayload, WebhookResponse};
pub use errors::{ApplicationError, DomainError};
pub use quotes::QuoteDraft;
pub use routing::{workflow_for, WorkflowTag};
pub use scoring::{
    LeadQuality, LeadScore, RuleBasedScorer, ScoreThresholds, ScoringError, ScoringStrategy,
};
