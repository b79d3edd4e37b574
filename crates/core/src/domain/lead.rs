use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Minimum problem description length for quote generation.
pub const QUALIFIED_PROBLEM_TEXT_CHARS: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeadId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Nurture,
    Quoted,
    Converted,
    Lost,
    Spam,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Nurture => "nurture",
            Self::Quoted => "quoted",
            Self::Converted => "converted",
            Self::Lost => "lost",
            Self::Spam => "spam",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "new" => Some(Self::New),
            "contacted" => Some(Self::Contacted),
            "qualified" => Some(Self::Qualified),
            "nurture" => Some(Self::Nurture),
            "quoted" => Some(Self::Quoted),
            "converted" => Some(Self::Converted),
            "lost" => Some(Self::Lost),
            "spam" => Some(Self::Spam),
            _ => None,
        }
    }
}

/// A prospective client captured from an inbound conversation or form.
///
/// Every descriptive attribute is optional: leads arrive half-filled and are
/// enriched over time. `status` is a loose workflow tag, not a state machine;
/// routing only ever moves a lead toward qualified/nurture.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub website: Option<String>,
    pub problem_text: Option<String>,
    pub automation_area: Option<String>,
    #[serde(default)]
    pub tools_used: Vec<String>,
    pub budget_range: Option<String>,
    pub timeline: Option<String>,
    pub urgency: Option<String>,
    /// Self-reported interest on a 1-10 scale.
    pub interest_level: Option<u8>,
    pub source: String,
    pub status: LeadStatus,
    pub lead_score: Option<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub last_contact_at: Option<DateTime<Utc>>,
    pub converted_at: Option<DateTime<Utc>>,
}

impl Lead {
    pub fn new(id: LeadId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: None,
            email: None,
            company: None,
            role: None,
            phone: None,
            industry: None,
            company_size: None,
            website: None,
            problem_text: None,
            automation_area: None,
            tools_used: Vec::new(),
            budget_range: None,
            timeline: None,
            urgency: None,
            interest_level: None,
            source: "chat".to_string(),
            status: LeadStatus::New,
            lead_score: None,
            created_at,
            updated_at: None,
            last_contact_at: None,
            converted_at: None,
        }
    }

    /// Build a lead from a webhook event's `data` object. The id is the
    /// only mandatory field; everything else defaults to absent.
    pub fn from_event_data(
        data: &serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let id = data
            .get("id")
            .and_then(|value| value.as_str())
            .filter(|value| !value.is_empty())
            .ok_or(DomainError::MissingField("id"))?;

        let text = |key: &str| -> Option<String> {
            data.get(key).and_then(|value| value.as_str()).map(str::to_string)
        };

        let mut lead = Self::new(LeadId(id.to_string()), now);
        lead.name = text("name");
        lead.email = text("email");
        lead.company = text("company");
        lead.role = text("role");
        lead.phone = text("phone");
        lead.industry = text("industry");
        lead.company_size = text("company_size");
        lead.website = text("website");
        lead.problem_text = text("problem_text");
        lead.automation_area = text("automation_area");
        lead.tools_used = data
            .get("tools_used")
            .and_then(|value| value.as_array())
            .map(|values| {
                values
                    .iter()
                    .filter_map(|value| value.as_str())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        lead.budget_range = text("budget_range");
        lead.timeline = text("timeline");
        lead.urgency = text("urgency");
        lead.interest_level = data
            .get("interest_level")
            .and_then(|value| value.as_u64())
            .map(|value| value.min(u64::from(u8::MAX)) as u8);
        if let Some(source) = text("source") {
            lead.source = source;
        }
        Ok(lead)
    }

    /// Minimum-completeness gate for quote generation, independent of the
    /// numeric score. Requires identity fields plus a problem description of
    /// at least [`QUALIFIED_PROBLEM_TEXT_CHARS`] characters.
    pub fn is_qualified(&self) -> bool {
        self.name.is_some()
            && self.email.is_some()
            && self.company.is_some()
            && self
                .problem_text
                .as_deref()
                .map(|text| text.chars().count() >= QUALIFIED_PROBLEM_TEXT_CHARS)
                .unwrap_or(false)
    }

    pub fn is_complete(&self) -> bool {
        self.is_qualified() && self.budget_range.is_some() && self.timeline.is_some()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{Lead, LeadId, LeadStatus};

    fn qualified_lead() -> Lead {
        let mut lead = Lead::new(LeadId("lead-1".to_string()), Utc::now());
        lead.name = Some("Ada Byron".to_string());
        lead.email = Some("ada@example.com".to_string());
        lead.company = Some("Analytical Engines".to_string());
        lead.problem_text = Some("We need to automate invoicing".to_string());
        lead
    }

    #[test]
    fn qualification_requires_twenty_problem_chars() {
        let mut lead = qualified_lead();

        lead.problem_text = Some("a".repeat(19));
        assert!(!lead.is_qualified());

        lead.problem_text = Some("a".repeat(20));
        assert!(lead.is_qualified());
    }

    #[test]
    fn qualification_requires_identity_fields() {
        let mut lead = qualified_lead();
        assert!(lead.is_qualified());

        lead.company = None;
        assert!(!lead.is_qualified());
    }

    #[test]
    fn completeness_adds_budget_and_timeline() {
        let mut lead = qualified_lead();
        assert!(!lead.is_complete());

        lead.budget_range = Some("$10k".to_string());
        lead.timeline = Some("next month".to_string());
        assert!(lead.is_complete());
    }

    #[test]
    fn event_data_requires_an_id() {
        let now = Utc::now();
        let missing = Lead::from_event_data(&serde_json::json!({"name": "Ada"}), now);
        assert!(missing.is_err());

        let empty = Lead::from_event_data(&serde_json::json!({"id": ""}), now);
        assert!(empty.is_err());
    }

    #[test]
    fn event_data_maps_known_fields_and_defaults_the_rest() {
        let data = serde_json::json!({
            "id": "lead-7",
            "name": "Ada",
            "email": "ada@example.com",
            "tools_used": ["Slack", "Zapier"],
            "interest_level": 9,
            "source": "form"
        });

        let lead = Lead::from_event_data(&data, Utc::now()).expect("lead builds");

        assert_eq!(lead.id, LeadId("lead-7".to_string()));
        assert_eq!(lead.tools_used, vec!["Slack".to_string(), "Zapier".to_string()]);
        assert_eq!(lead.interest_level, Some(9));
        assert_eq!(lead.source, "form");
        assert_eq!(lead.status, LeadStatus::New);
        assert_eq!(lead.company, None);
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            LeadStatus::New,
            LeadStatus::Contacted,
            LeadStatus::Qualified,
            LeadStatus::Nurture,
            LeadStatus::Quoted,
            LeadStatus::Converted,
            LeadStatus::Lost,
            LeadStatus::Spam,
        ] {
            assert_eq!(LeadStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(LeadStatus::parse("unknown"), None);
    }
}
