use async_trait::async_trait;
use thiserror::Error;

use leadflow_core::domain::lead::{Lead, LeadId, LeadStatus};
use leadflow_core::domain::quote::{Quote, QuoteId, QuoteStatus};

pub mod conversation;
pub mod lead;
pub mod memory;
pub mod quote;

pub use conversation::SqlConversationRepository;
pub use lead::SqlLeadRepository;
pub use memory::{
    InMemoryConversationRepository, InMemoryLeadRepository, InMemoryQuoteRepository,
};
pub use quote::{QuoteWithLead, SqlQuoteRepository};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait LeadRepository: Send + Sync {
    async fn find_by_id(&self, id: &LeadId) -> Result<Option<Lead>, RepositoryError>;

    async fn insert(&self, lead: &Lead) -> Result<(), RepositoryError>;

    /// Record a routing result: always the score, optionally a new status.
    async fn update_score(
        &self,
        id: &LeadId,
        score_total: u8,
        status: Option<LeadStatus>,
    ) -> Result<(), RepositoryError>;

    /// Status change outside routing (conversion, nurture after decline).
    /// Stamps last_contact_at, and converted_at for `Converted`.
    async fn update_status(&self, id: &LeadId, status: LeadStatus)
        -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait QuoteRepository: Send + Sync {
    async fn insert(&self, quote: &Quote) -> Result<(), RepositoryError>;

    async fn find_with_lead(&self, id: &QuoteId)
        -> Result<Option<QuoteWithLead>, RepositoryError>;

    /// Lifecycle update; stamps the matching timestamp column and records
    /// the decline reason when given.
    async fn update_status(
        &self,
        id: &QuoteId,
        status: QuoteStatus,
        reason: Option<&str>,
    ) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn mark_completed(&self, conversation_id: &str) -> Result<(), RepositoryError>;
}
