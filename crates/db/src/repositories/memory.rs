//! In-memory repositories for tests and wiring without a database.
//!
//! Writes can be forced to fail to exercise best-effort persistence paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use leadflow_core::domain::lead::{Lead, LeadId, LeadStatus};
use leadflow_core::domain::quote::{Quote, QuoteId, QuoteStatus};

use super::{
    ConversationRepository, LeadRepository, QuoteRepository, QuoteWithLead, RepositoryError,
};

#[derive(Default)]
pub struct InMemoryLeadRepository {
    leads: Mutex<HashMap<String, Lead>>,
    fail_writes: AtomicBool,
}

impl InMemoryLeadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lead(lead: Lead) -> Self {
        let repo = Self::default();
        repo.leads
            .lock()
            .expect("lead store lock")
            .insert(lead.id.0.clone(), lead);
        repo
    }

    /// All subsequent writes fail with [`RepositoryError::Unavailable`].
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn get(&self, id: &LeadId) -> Option<Lead> {
        self.leads.lock().expect("lead store lock").get(&id.0).cloned()
    }

    fn check_writable(&self) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("write failure injected".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl LeadRepository for InMemoryLeadRepository {
    async fn find_by_id(&self, id: &LeadId) -> Result<Option<Lead>, RepositoryError> {
        Ok(self.get(id))
    }

    async fn insert(&self, lead: &Lead) -> Result<(), RepositoryError> {
        self.check_writable()?;
        self.leads
            .lock()
            .expect("lead store lock")
            .insert(lead.id.0.clone(), lead.clone());
        Ok(())
    }

    async fn update_score(
        &self,
        id: &LeadId,
        score_total: u8,
        status: Option<LeadStatus>,
    ) -> Result<(), RepositoryError> {
        self.check_writable()?;
        let mut leads = self.leads.lock().expect("lead store lock");
        if let Some(lead) = leads.get_mut(&id.0) {
            lead.lead_score = Some(score_total);
            if let Some(status) = status {
                lead.status = status;
            }
            lead.updated_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn update_status(
        &self,
        id: &LeadId,
        status: LeadStatus,
    ) -> Result<(), RepositoryError> {
        self.check_writable()?;
        let mut leads = self.leads.lock().expect("lead store lock");
        if let Some(lead) = leads.get_mut(&id.0) {
            let now = Utc::now();
            lead.status = status;
            lead.last_contact_at = Some(now);
            lead.updated_at = Some(now);
            if status == LeadStatus::Converted {
                lead.converted_at = Some(now);
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryQuoteRepository {
    quotes: Mutex<HashMap<String, Quote>>,
    fail_writes: AtomicBool,
}

impl InMemoryQuoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn get(&self, id: &QuoteId) -> Option<Quote> {
        self.quotes.lock().expect("quote store lock").get(&id.0).cloned()
    }

    fn check_writable(&self) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("write failure injected".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn insert(&self, quote: &Quote) -> Result<(), RepositoryError> {
        self.check_writable()?;
        self.quotes
            .lock()
            .expect("quote store lock")
            .insert(quote.id.0.clone(), quote.clone());
        Ok(())
    }

    async fn find_with_lead(
        &self,
        id: &QuoteId,
    ) -> Result<Option<QuoteWithLead>, RepositoryError> {
        Ok(self.get(id).map(|quote| QuoteWithLead {
            quote,
            lead_name: None,
            lead_email: None,
            lead_company: None,
        }))
    }

    async fn update_status(
        &self,
        id: &QuoteId,
        status: QuoteStatus,
        reason: Option<&str>,
    ) -> Result<(), RepositoryError> {
        self.check_writable()?;
        let mut quotes = self.quotes.lock().expect("quote store lock");
        if let Some(quote) = quotes.get_mut(&id.0) {
            let now = Utc::now();
            quote.status = status;
            match status {
                QuoteStatus::Sent => quote.sent_at = Some(now),
                QuoteStatus::Viewed => quote.viewed_at = Some(now),
                QuoteStatus::Accepted => quote.accepted_at = Some(now),
                QuoteStatus::Declined => {
                    quote.declined_at = Some(now);
                    if let Some(reason) = reason {
                        quote.decline_reason = Some(reason.to_string());
                    }
                }
                QuoteStatus::Draft | QuoteStatus::Expired => {}
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryConversationRepository {
    completed: Mutex<Vec<String>>,
    fail_writes: AtomicBool,
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn completed_ids(&self) -> Vec<String> {
        self.completed.lock().expect("conversation store lock").clone()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn mark_completed(&self, conversation_id: &str) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("write failure injected".to_string()));
        }
        self.completed
            .lock()
            .expect("conversation store lock")
            .push(conversation_id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use leadflow_core::domain::lead::{Lead, LeadId, LeadStatus};

    use super::{InMemoryLeadRepository, LeadRepository, RepositoryError};

    #[tokio::test]
    async fn injected_failure_rejects_writes_but_not_reads() {
        let lead = Lead::new(LeadId("lead-1".to_string()), Utc::now());
        let repo = InMemoryLeadRepository::with_lead(lead.clone());
        repo.fail_writes(true);

        let error = repo
            .update_score(&lead.id, 50, Some(LeadStatus::Nurture))
            .await
            .expect_err("writes should fail");
        assert!(matches!(error, RepositoryError::Unavailable(_)));

        let loaded = repo.find_by_id(&lead.id).await.expect("reads still work");
        assert_eq!(loaded.map(|value| value.status), Some(LeadStatus::New));
    }
}
