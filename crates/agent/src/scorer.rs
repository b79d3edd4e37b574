//! Lead scoring entry point: model-backed primary strategy with a
//! deterministic rule-based fallback.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use leadflow_core::domain::lead::Lead;
use leadflow_core::scoring::{
    rules, LeadScore, RuleBasedScorer, ScoringError, ScoringStrategy,
};

use crate::llm::LlmClient;

const SYSTEM_PROMPT: &str =
    "You are a lead scoring expert. Analyze leads objectively and return JSON scores.";

/// Model-backed scoring strategy. Any failure (transport, malformed output,
/// missing keys) surfaces as a [`ScoringError`] for the caller to substitute
/// the fallback.
pub struct ModelScorer {
    client: Arc<dyn LlmClient>,
}

impl ModelScorer {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ScoringStrategy for ModelScorer {
    async fn score(&self, lead: &Lead) -> Result<LeadScore, ScoringError> {
        let prompt = scoring_prompt(lead);
        let response = self
            .client
            .complete(SYSTEM_PROMPT, &prompt)
            .await
            .map_err(|error| ScoringError::Backend(error.to_string()))?;

        parse_score_response(&response)
    }
}

/// Composed scorer: never fails. Uses the model when one is configured and
/// degrades silently to rule-based scoring on any model-path failure.
pub struct LeadScorer {
    primary: Option<Arc<dyn ScoringStrategy>>,
    fallback: RuleBasedScorer,
}

impl LeadScorer {
    pub fn rule_based_only() -> Self {
        Self { primary: None, fallback: RuleBasedScorer }
    }

    pub fn with_model(client: Arc<dyn LlmClient>) -> Self {
        Self { primary: Some(Arc::new(ModelScorer::new(client))), fallback: RuleBasedScorer }
    }

    pub fn with_strategy(primary: Arc<dyn ScoringStrategy>) -> Self {
        Self { primary: Some(primary), fallback: RuleBasedScorer }
    }

    pub async fn score(&self, lead: &Lead) -> LeadScore {
        let Some(primary) = &self.primary else {
            debug!(
                event_name = "scoring.model_unconfigured",
                lead_id = %lead.id.0,
                "model backend not configured, using rule-based scoring"
            );
            return self.fallback_score(lead).await;
        };

        match primary.score(lead).await {
            Ok(score) => score,
            Err(error) => {
                warn!(
                    event_name = "scoring.model_failed",
                    lead_id = %lead.id.0,
                    error = %error,
                    "model scoring failed, falling back to rule-based scoring"
                );
                self.fallback_score(lead).await
            }
        }
    }

    async fn fallback_score(&self, lead: &Lead) -> LeadScore {
        // RuleBasedScorer is infallible; unwrap via the strategy interface
        // keeps the entry point total either way.
        self.fallback.score(lead).await.unwrap_or_else(|_| rules::score(lead))
    }
}

/// The model must answer with exactly these six integer keys.
#[derive(Debug, Deserialize)]
struct RawDimensionScores {
    interest_level: i64,
    budget_clarity: i64,
    urgency: i64,
    problem_clarity: i64,
    decision_authority: i64,
    tech_readiness: i64,
}

fn parse_score_response(response: &str) -> Result<LeadScore, ScoringError> {
    let body = strip_code_fences(response);
    let raw: RawDimensionScores = serde_json::from_str(body.trim())
        .map_err(|error| ScoringError::MalformedResponse(error.to_string()))?;

    Ok(LeadScore::from_parts(
        raw.interest_level,
        raw.budget_clarity,
        raw.urgency,
        raw.problem_clarity,
        raw.decision_authority,
        raw.tech_readiness,
    ))
}

/// Models often wrap JSON in a fenced code block despite instructions.
fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();

    if let Some(rest) = trimmed.strip_prefix("```json") {
        return rest.split("```").next().unwrap_or(rest);
    }
    if let Some(rest) = trimmed.strip_prefix("```") {
        return rest.split("```").next().unwrap_or(rest);
    }
    trimmed
}

fn scoring_prompt(lead: &Lead) -> String {
    let field = |value: &Option<String>| -> String {
        value.clone().unwrap_or_else(|| "Not provided".to_string())
    };
    let tools = if lead.tools_used.is_empty() {
        "Not provided".to_string()
    } else {
        lead.tools_used.join(", ")
    };
    let interest = lead
        .interest_level
        .map(|level| level.to_string())
        .unwrap_or_else(|| "Not provided".to_string());

    format!(
        "Analyze this lead and provide a JSON score.\n\
         \n\
         Lead Information:\n\
         - Name: {name}\n\
         - Company: {company}\n\
         - Role: {role}\n\
         - Industry: {industry}\n\
         - Company Size: {company_size}\n\
         - Problem: {problem}\n\
         - Automation Area: {automation_area}\n\
         - Tools Used: {tools}\n\
         - Budget Range: {budget}\n\
         - Timeline: {timeline}\n\
         - Urgency: {urgency}\n\
         - Interest Level (self-reported): {interest}\n\
         \n\
         Score each dimension (be strict but fair):\n\
         \n\
         1. interest_level (0-20): based on engagement and specificity; vague curiosity = 2-5, \
         detailed follow-through = 18-20\n\
         2. budget_clarity (0-20): clear budget = 20, vague = 5-10, no budget = 0-5\n\
         3. urgency (0-15): \"ASAP\"/\"urgent\" = 15, specific date = 10-12, \"flexible\" = 5\n\
         4. problem_clarity (0-20): detailed problem = 20, generic = 5-10, none = 0\n\
         5. decision_authority (0-15): owner/C-level = 15, manager = 10, employee = 5\n\
         6. tech_readiness (0-10): uses modern tools = 10, basic = 5, none mentioned = 2\n\
         \n\
         Respond ONLY with valid JSON:\n\
         {{\"interest_level\": X, \"budget_clarity\": X, \"urgency\": X, \"problem_clarity\": X, \
         \"decision_authority\": X, \"tech_readiness\": X}}",
        name = field(&lead.name),
        company = field(&lead.company),
        role = field(&lead.role),
        industry = field(&lead.industry),
        company_size = field(&lead.company_size),
        problem = field(&lead.problem_text),
        automation_area = field(&lead.automation_area),
        tools = tools,
        budget = field(&lead.budget_range),
        timeline = field(&lead.timeline),
        urgency = field(&lead.urgency),
        interest = interest,
    )
}
