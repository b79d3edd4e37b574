//! Score-and-route pipeline for inbound leads.

use std::sync::Arc;

use tracing::{error, info};

use leadflow_core::domain::lead::{Lead, LeadId};
use leadflow_core::routing::{workflow_for, WorkflowTag};
use leadflow_core::scoring::{LeadScore, ScoreThresholds};
use leadflow_db::LeadRepository;

use crate::scorer::LeadScorer;

pub struct LeadProcessor {
    leads: Arc<dyn LeadRepository>,
    scorer: LeadScorer,
    thresholds: ScoreThresholds,
}

impl LeadProcessor {
    pub fn new(
        leads: Arc<dyn LeadRepository>,
        scorer: LeadScorer,
        thresholds: ScoreThresholds,
    ) -> Self {
        Self { leads, scorer, thresholds }
    }

    /// Always returns a valid score; model failures degrade to rules.
    pub async fn score(&self, lead: &Lead) -> LeadScore {
        self.scorer.score(lead).await
    }

    /// Dispatch the lead to a workflow from its quality tier.
    ///
    /// The score/status write is best-effort: a persistence failure is
    /// logged and the computed tag is returned regardless.
    pub async fn route(&self, lead: &Lead, score: &LeadScore) -> WorkflowTag {
        let quality = score.quality_with(&self.thresholds);
        let workflow = workflow_for(quality);

        info!(
            event_name = "lead.routing",
            lead_id = %lead.id.0,
            score = score.total,
            quality = quality.as_str(),
            workflow = workflow.as_str(),
            "routing lead"
        );

        if let Err(persist_error) =
            self.leads.update_score(&lead.id, score.total, workflow.status_update()).await
        {
            error!(
                event_name = "lead.routing.persist_failed",
                lead_id = %lead.id.0,
                error = %persist_error,
                "failed to persist lead score, continuing with routing decision"
            );
        }

        workflow
    }

    /// Score then route in one step.
    pub async fn process(&self, lead: &Lead) -> (LeadScore, WorkflowTag) {
        let score = self.score(lead).await;
        let workflow = self.route(lead, &score).await;
        (score, workflow)
    }

    pub async fn get_lead(&self, id: &LeadId) -> Option<Lead> {
        match self.leads.find_by_id(id).await {
            Ok(lead) => lead,
            Err(error) => {
                error!(
                    event_name = "lead.load_failed",
                    lead_id = %id.0,
                    error = %error,
                    "failed to fetch lead"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use leadflow_core::domain::lead::{Lead, LeadId, LeadStatus};
    use leadflow_core::routing::WorkflowTag;
    use leadflow_core::scoring::{LeadScore, ScoreThresholds};
    use leadflow_db::InMemoryLeadRepository;

    use crate::scorer::LeadScorer;

    use super::LeadProcessor;

    fn lead() -> Lead {
        Lead::new(LeadId("lead-1".to_string()), Utc::now())
    }

    fn score_with_total(total: u8) -> LeadScore {
        let ceilings = [20i64, 20, 15, 20, 15, 10];
        let mut remaining = i64::from(total);
        let mut parts = [0i64; 6];
        for (slot, ceiling) in parts.iter_mut().zip(ceilings) {
            *slot = remaining.min(ceiling);
            remaining -= *slot;
        }
        LeadScore::from_parts(parts[0], parts[1], parts[2], parts[3], parts[4], parts[5])
    }

    fn processor(repo: Arc<InMemoryLeadRepository>) -> LeadProcessor {
        LeadProcessor::new(repo, LeadScorer::rule_based_only(), ScoreThresholds::default())
    }

    #[tokio::test]
    async fn high_quality_lead_is_marked_qualified() {
        let lead = lead();
        let repo = Arc::new(InMemoryLeadRepository::with_lead(lead.clone()));
        let processor = processor(repo.clone());

        let workflow = processor.route(&lead, &score_with_total(85)).await;

        assert_eq!(workflow, WorkflowTag::QualifiedLead);
        let stored = repo.get(&lead.id).expect("lead exists");
        assert_eq!(stored.status, LeadStatus::Qualified);
        assert_eq!(stored.lead_score, Some(85));
    }

    #[tokio::test]
    async fn medium_quality_lead_is_marked_nurture() {
        let lead = lead();
        let repo = Arc::new(InMemoryLeadRepository::with_lead(lead.clone()));
        let processor = processor(repo.clone());

        let workflow = processor.route(&lead, &score_with_total(55)).await;

        assert_eq!(workflow, WorkflowTag::Nurture);
        let stored = repo.get(&lead.id).expect("lead exists");
        assert_eq!(stored.status, LeadStatus::Nurture);
        assert_eq!(stored.lead_score, Some(55));
    }

    #[tokio::test]
    async fn low_quality_lead_keeps_its_status() {
        let lead = lead();
        let repo = Arc::new(InMemoryLeadRepository::with_lead(lead.clone()));
        let processor = processor(repo.clone());

        let workflow = processor.route(&lead, &score_with_total(20)).await;

        assert_eq!(workflow, WorkflowTag::LowQuality);
        let stored = repo.get(&lead.id).expect("lead exists");
        assert_eq!(stored.status, LeadStatus::New);
        assert_eq!(stored.lead_score, Some(20));
    }

    #[tokio::test]
    async fn persistence_failure_does_not_change_the_routing_decision() {
        let lead = lead();
        let repo = Arc::new(InMemoryLeadRepository::with_lead(lead.clone()));
        repo.fail_writes(true);
        let processor = processor(repo.clone());

        let workflow = processor.route(&lead, &score_with_total(55)).await;

        assert_eq!(workflow, WorkflowTag::Nurture);
        let stored = repo.get(&lead.id).expect("lead exists");
        assert_eq!(stored.status, LeadStatus::New, "failed write leaves the lead untouched");
        assert_eq!(stored.lead_score, None);
    }

    #[tokio::test]
    async fn custom_thresholds_change_the_dispatch() {
        let lead = lead();
        let repo = Arc::new(InMemoryLeadRepository::with_lead(lead.clone()));
        let processor = LeadProcessor::new(
            repo.clone(),
            LeadScorer::rule_based_only(),
            ScoreThresholds { qualified: 50, nurture: 30 },
        );

        let workflow = processor.route(&lead, &score_with_total(55)).await;
        assert_eq!(workflow, WorkflowTag::QualifiedLead);
    }

    #[tokio::test]
    async fn process_scores_then_routes() {
        let mut lead = lead();
        lead.interest_level = Some(10);
        lead.budget_range = Some("$50k".to_string());
        lead.urgency = Some("asap".to_string());
        lead.problem_text = Some("p".repeat(120));
        lead.role = Some("founder".to_string());
        lead.tools_used = vec!["Slack".to_string(), "Zapier".to_string(), "Notion".to_string()];

        let repo = Arc::new(InMemoryLeadRepository::with_lead(lead.clone()));
        let processor = processor(repo.clone());

        let (score, workflow) = processor.process(&lead).await;

        assert_eq!(score.total, 92);
        assert_eq!(workflow, WorkflowTag::QualifiedLead);
        assert_eq!(repo.get(&lead.id).expect("lead exists").lead_score, Some(92));
    }
}
