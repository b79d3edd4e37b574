//! Quality-tier dispatch: maps a scored lead onto one of three workflows.

use serde::{Deserialize, Serialize};

use crate::domain::lead::LeadStatus;
use crate::scoring::LeadQuality;

/// Symbolic result of routing, naming the downstream process that should
/// run: quote generation, nurture sequence, or polite decline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowTag {
    #[serde(rename = "qualified_lead_workflow")]
    QualifiedLead,
    #[serde(rename = "nurture_workflow")]
    Nurture,
    #[serde(rename = "low_quality_workflow")]
    LowQuality,
}

impl WorkflowTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QualifiedLead => "qualified_lead_workflow",
            Self::Nurture => "nurture_workflow",
            Self::LowQuality => "low_quality_workflow",
        }
    }

    /// The lead status the routing step persists alongside the score.
    /// Low-quality routing records the score but leaves status untouched.
    pub fn status_update(&self) -> Option<LeadStatus> {
        match self {
            Self::QualifiedLead => Some(LeadStatus::Qualified),
            Self::Nurture => Some(LeadStatus::Nurture),
            Self::LowQuality => None,
        }
    }
}

pub fn workflow_for(quality: LeadQuality) -> WorkflowTag {
    match quality {
        LeadQuality::High => WorkflowTag::QualifiedLead,
        LeadQuality::Medium => WorkflowTag::Nurture,
        LeadQuality::Low => WorkflowTag::LowQuality,
    }
}
