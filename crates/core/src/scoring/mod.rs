//! Lead scoring model: six weighted dimensions summing to a bounded total.
//!
//! Ceilings are fixed by the scoring rubric; quality thresholds are
//! configurable and default to 70/40.

pub mod rules;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::lead::Lead;

pub use rules::RuleBasedScorer;

pub const INTEREST_LEVEL_MAX: u8 = 20;
pub const BUDGET_CLARITY_MAX: u8 = 20;
pub const URGENCY_MAX: u8 = 15;
pub const PROBLEM_CLARITY_MAX: u8 = 20;
pub const DECISION_AUTHORITY_MAX: u8 = 15;
pub const TECH_READINESS_MAX: u8 = 10;
pub const TOTAL_MAX: u8 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadQuality {
    High,
    Medium,
    Low,
}

impl LeadQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Quality tier boundaries over the total score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreThresholds {
    pub qualified: u8,
    pub nurture: u8,
}

impl Default for ScoreThresholds {
    fn default() -> Self {
        Self { qualified: 70, nurture: 40 }
    }
}

/// Immutable scoring breakdown for a lead.
///
/// Construction clamps every sub-score to its dimension ceiling and the
/// total to [0, 100]; `total` is always the sum of the stored sub-scores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadScore {
    pub total: u8,
    pub interest_level: u8,
    pub budget_clarity: u8,
    pub urgency: u8,
    pub problem_clarity: u8,
    pub decision_authority: u8,
    pub tech_readiness: u8,
}

impl LeadScore {
    /// Build a score from raw dimension values, clamping each to its
    /// declared range. Out-of-range values from a misbehaving backend are
    /// clamped, not rejected.
    pub fn from_parts(
        interest_level: i64,
        budget_clarity: i64,
        urgency: i64,
        problem_clarity: i64,
        decision_authority: i64,
        tech_readiness: i64,
    ) -> Self {
        let interest_level = clamp_dimension(interest_level, INTEREST_LEVEL_MAX);
        let budget_clarity = clamp_dimension(budget_clarity, BUDGET_CLARITY_MAX);
        let urgency = clamp_dimension(urgency, URGENCY_MAX);
        let problem_clarity = clamp_dimension(problem_clarity, PROBLEM_CLARITY_MAX);
        let decision_authority = clamp_dimension(decision_authority, DECISION_AUTHORITY_MAX);
        let tech_readiness = clamp_dimension(tech_readiness, TECH_READINESS_MAX);

        let sum = u16::from(interest_level)
            + u16::from(budget_clarity)
            + u16::from(urgency)
            + u16::from(problem_clarity)
            + u16::from(decision_authority)
            + u16::from(tech_readiness);

        Self {
            total: sum.min(u16::from(TOTAL_MAX)) as u8,
            interest_level,
            budget_clarity,
            urgency,
            problem_clarity,
            decision_authority,
            tech_readiness,
        }
    }

    pub fn quality_with(&self, thresholds: &ScoreThresholds) -> LeadQuality {
        if self.total >= thresholds.qualified {
            LeadQuality::High
        } else if self.total >= thresholds.nurture {
            LeadQuality::Medium
        } else {
            LeadQuality::Low
        }
    }

    pub fn quality(&self) -> LeadQuality {
        self.quality_with(&ScoreThresholds::default())
    }
}

fn clamp_dimension(value: i64, max: u8) -> u8 {
    value.clamp(0, i64::from(max)) as u8
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ScoringError {
    #[error("model backend failure: {0}")]
    Backend(String),
    #[error("malformed model response: {0}")]
    MalformedResponse(String),
}

/// A scoring strategy produces a full breakdown or fails; the composed
/// scorer substitutes the deterministic fallback on any failure.
#[async_trait]
pub trait ScoringStrategy: Send + Sync {
    async fn score(&self, lead: &Lead) -> Result<LeadScore, ScoringError>;
}

#[cfg(test)]
mod tests {
    use super::{LeadQuality, LeadScore, ScoreThresholds};

    #[test]
    fn construction_clamps_each_dimension_to_its_ceiling() {
        let score = LeadScore::from_parts(35, -4, 99, 21, 16, 11);

        assert_eq!(score.interest_level, 20);
        assert_eq!(score.budget_clarity, 0);
        assert_eq!(score.urgency, 15);
        assert_eq!(score.problem_clarity, 20);
        assert_eq!(score.decision_authority, 15);
        assert_eq!(score.tech_readiness, 10);
        assert_eq!(score.total, 80);
    }

    #[test]
    fn total_is_the_sum_of_stored_sub_scores() {
        let score = LeadScore::from_parts(20, 15, 15, 18, 15, 9);
        let sum = score.interest_level
            + score.budget_clarity
            + score.urgency
            + score.problem_clarity
            + score.decision_authority
            + score.tech_readiness;
        assert_eq!(score.total, sum);
    }

    #[test]
    fn quality_is_a_monotonic_step_function_of_total() {
        let thresholds = ScoreThresholds::default();
        let cases = [
            (100, LeadQuality::High),
            (70, LeadQuality::High),
            (69, LeadQuality::Medium),
            (40, LeadQuality::Medium),
            (39, LeadQuality::Low),
            (0, LeadQuality::Low),
        ];

        for (total, expected) in cases {
            let score = score_with_total(total);
            assert_eq!(score.total, total, "fixture should hit total {total}");
            assert_eq!(score.quality_with(&thresholds), expected, "total {total}");
        }
    }

    #[test]
    fn custom_thresholds_shift_the_tier_boundaries() {
        let thresholds = ScoreThresholds { qualified: 80, nurture: 50 };
        assert_eq!(score_with_total(75).quality_with(&thresholds), LeadQuality::Medium);
        assert_eq!(score_with_total(45).quality_with(&thresholds), LeadQuality::Low);
    }

    fn score_with_total(total: u8) -> LeadScore {
        // Fill dimensions greedily in declaration order until `total` is
        // reached; ceilings sum to exactly 100.
        let ceilings = [20i64, 20, 15, 20, 15, 10];
        let mut remaining = i64::from(total);
        let mut parts = [0i64; 6];
        for (slot, ceiling) in parts.iter_mut().zip(ceilings) {
            *slot = remaining.min(ceiling);
            remaining -= *slot;
        }
        LeadScore::from_parts(parts[0], parts[1], parts[2], parts[3], parts[4], parts[5])
    }
}
