//! Deterministic rule-based scoring.
//!
//! This is the reference scoring behavior: identical lead input always
//! yields an identical breakdown, with no external dependencies. Each
//! branch respects its dimension ceiling by construction.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::lead::Lead;
use crate::scoring::{LeadScore, ScoringError, ScoringStrategy, TECH_READINESS_MAX};

const IMMEDIATE_KEYWORDS: [&str; 4] = ["asap", "urgent", "immediately", "now"];
const NEAR_TERM_KEYWORDS: [&str; 3] = ["month", "week", "soon"];
const MAGNITUDE_KEYWORDS: [&str; 4] = ["k", "50", "100", "20"];
const EXECUTIVE_KEYWORDS: [&str; 5] = ["ceo", "cto", "founder", "owner", "director"];
const MANAGER_KEYWORDS: [&str; 4] = ["manager", "head", "lead", "vp"];

pub fn score(lead: &Lead) -> LeadScore {
    LeadScore::from_parts(
        interest_level_score(lead.interest_level),
        budget_clarity_score(lead.budget_range.as_deref()),
        urgency_score(lead.urgency.as_deref(), lead.timeline.as_deref()),
        problem_clarity_score(lead.problem_text.as_deref()),
        decision_authority_score(lead.role.as_deref()),
        tech_readiness_score(&lead.tools_used),
    )
}

// An empty string carries no signal; treat it like a missing field.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.is_empty())
}

pub fn interest_level_score(self_reported: Option<u8>) -> i64 {
    match self_reported {
        Some(level) => (i64::from(level) * 2).min(20),
        None => 0,
    }
}

pub fn budget_clarity_score(budget_range: Option<&str>) -> i64 {
    let Some(budget) = present(budget_range) else {
        return 0;
    };
    let budget = budget.to_ascii_lowercase();

    if budget.contains('$') || MAGNITUDE_KEYWORDS.iter().any(|keyword| budget.contains(keyword)) {
        15
    } else if budget.contains("flexible") || budget.contains("discuss") {
        10
    } else {
        5
    }
}

pub fn urgency_score(urgency: Option<&str>, timeline: Option<&str>) -> i64 {
    let Some(text) = present(urgency).or_else(|| present(timeline)) else {
        return 0;
    };
    let text = text.to_ascii_lowercase();

    if IMMEDIATE_KEYWORDS.iter().any(|keyword| text.contains(keyword)) {
        15
    } else if NEAR_TERM_KEYWORDS.iter().any(|keyword| text.contains(keyword)) {
        10
    } else {
        5
    }
}

pub fn problem_clarity_score(problem_text: Option<&str>) -> i64 {
    let Some(text) = present(problem_text) else {
        return 0;
    };

    match text.chars().count() {
        length if length > 100 => 18,
        length if length > 50 => 12,
        length if length > 20 => 8,
        _ => 4,
    }
}

pub fn decision_authority_score(role: Option<&str>) -> i64 {
    let Some(role) = present(role) else {
        return 0;
    };
    let role = role.to_ascii_lowercase();

    if EXECUTIVE_KEYWORDS.iter().any(|keyword| role.contains(keyword)) {
        15
    } else if MANAGER_KEYWORDS.iter().any(|keyword| role.contains(keyword)) {
        10
    } else {
        5
    }
}

pub fn tech_readiness_score(tools_used: &[String]) -> i64 {
    let distinct_tools: BTreeSet<&str> = tools_used.iter().map(String::as_str).collect();
    (distinct_tools.len() as i64 * 3).min(i64::from(TECH_READINESS_MAX))
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RuleBasedScorer;

#[async_trait]
impl ScoringStrategy for RuleBasedScorer {
    async fn score(&self, lead: &Lead) -> Result<LeadScore, ScoringError> {
        Ok(score(lead))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::domain::lead::{Lead, LeadId};
    use crate::scoring::LeadQuality;

    use super::{
        budget_clarity_score, decision_authority_score, interest_level_score,
        problem_clarity_score, score, tech_readiness_score, urgency_score,
    };

    fn lead() -> Lead {
        Lead::new(LeadId("lead-1".to_string()), Utc::now())
    }

    #[test]
    fn fully_populated_lead_scores_high() {
        let mut lead = lead();
        lead.interest_level = Some(10);
        lead.budget_range = Some("$50k".to_string());
        lead.urgency = Some("ASAP".to_string());
        lead.problem_text = Some("x".repeat(120));
        lead.role = Some("CTO".to_string());
        lead.tools_used =
            vec!["Slack".to_string(), "Zapier".to_string(), "Notion".to_string()];

        let score = score(&lead);

        assert_eq!(score.interest_level, 20);
        assert_eq!(score.budget_clarity, 15);
        assert_eq!(score.urgency, 15);
        assert_eq!(score.problem_clarity, 18);
        assert_eq!(score.decision_authority, 15);
        assert_eq!(score.tech_readiness, 9);
        assert_eq!(score.total, 92);
        assert_eq!(score.quality(), LeadQuality::High);
    }

    #[test]
    fn sparse_lead_scores_low() {
        let mut lead = lead();
        lead.problem_text = Some("short text".to_string());

        let score = score(&lead);

        assert_eq!(score.interest_level, 0);
        assert_eq!(score.budget_clarity, 0);
        assert_eq!(score.urgency, 0);
        assert_eq!(score.problem_clarity, 4);
        assert_eq!(score.decision_authority, 0);
        assert_eq!(score.tech_readiness, 0);
        assert_eq!(score.total, 4);
        assert_eq!(score.quality(), LeadQuality::Low);
    }

    #[test]
    fn scoring_is_deterministic() {
        let mut lead = lead();
        lead.interest_level = Some(7);
        lead.budget_range = Some("flexible, happy to discuss".to_string());
        lead.timeline = Some("within a month".to_string());
        lead.problem_text = Some("y".repeat(60));
        lead.role = Some("operations manager".to_string());
        lead.tools_used = vec!["Airtable".to_string()];

        assert_eq!(score(&lead), score(&lead));
    }

    #[test]
    fn interest_doubles_and_caps_at_twenty() {
        assert_eq!(interest_level_score(None), 0);
        assert_eq!(interest_level_score(Some(1)), 2);
        assert_eq!(interest_level_score(Some(9)), 18);
        assert_eq!(interest_level_score(Some(10)), 20);
    }

    #[test]
    fn budget_tiers_on_signal_strength() {
        assert_eq!(budget_clarity_score(None), 0);
        assert_eq!(budget_clarity_score(Some("$5,000")), 15);
        assert_eq!(budget_clarity_score(Some("around 100 grand")), 15);
        assert_eq!(budget_clarity_score(Some("flexible")), 10);
        assert_eq!(budget_clarity_score(Some("we can discuss")), 10);
        assert_eq!(budget_clarity_score(Some("modest")), 5);
    }

    #[test]
    fn urgency_prefers_the_urgency_field_over_timeline() {
        assert_eq!(urgency_score(None, None), 0);
        assert_eq!(urgency_score(Some("ASAP"), Some("next year")), 15);
        assert_eq!(urgency_score(None, Some("next week")), 10);
        assert_eq!(urgency_score(Some("whenever"), None), 5);
    }

    #[test]
    fn problem_clarity_tiers_on_character_count() {
        assert_eq!(problem_clarity_score(None), 0);
        assert_eq!(problem_clarity_score(Some("")), 0, "empty text carries no signal");
        assert_eq!(problem_clarity_score(Some("short")), 4);
        assert_eq!(problem_clarity_score(Some(&"a".repeat(20))), 4);
        assert_eq!(problem_clarity_score(Some(&"a".repeat(21))), 8);
        assert_eq!(problem_clarity_score(Some(&"a".repeat(51))), 12);
        assert_eq!(problem_clarity_score(Some(&"a".repeat(101))), 18);
    }

    #[test]
    fn decision_authority_tiers_on_role_keywords() {
        assert_eq!(decision_authority_score(None), 0);
        assert_eq!(decision_authority_score(Some("Founder & CEO")), 15);
        assert_eq!(decision_authority_score(Some("Head of Sales")), 10);
        assert_eq!(decision_authority_score(Some("Analyst")), 5);
    }

    #[test]
    fn tech_readiness_counts_distinct_tools() {
        assert_eq!(tech_readiness_score(&[]), 0);
        assert_eq!(tech_readiness_score(&["Slack".to_string()]), 3);
        assert_eq!(
            tech_readiness_score(&["Slack".to_string(), "Slack".to_string()]),
            3,
            "duplicates should not inflate readiness"
        );
        assert_eq!(
            tech_readiness_score(&[
                "Slack".to_string(),
                "Zapier".to_string(),
                "Notion".to_string(),
                "Airtable".to_string(),
            ]),
            10
        );
    }
}
