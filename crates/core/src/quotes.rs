//! Deterministic quote drafting from a lead's stated automation needs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::lead::Lead;
use crate::domain::quote::{
    validity_window, Quote, QuoteId, QuoteStatus, QuoteTotals, ScopeItem, DEFAULT_VALID_DAYS,
};
use crate::errors::DomainError;

/// A quote before it is assigned an id and persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteDraft {
    pub project_title: String,
    pub project_summary: String,
    pub scope_items: Vec<ScopeItem>,
    pub currency: String,
    pub valid_days: i64,
    pub notes: Option<String>,
    pub discount_percent: Option<Decimal>,
}

impl QuoteDraft {
    /// Build a scope proposal from the lead's automation area keywords.
    pub fn for_lead(lead: &Lead) -> Self {
        Self {
            project_title: project_title(lead),
            project_summary: lead
                .problem_text
                .clone()
                .unwrap_or_else(|| "AI Automation Project".to_string()),
            scope_items: scope_items(lead),
            currency: "AUD".to_string(),
            valid_days: DEFAULT_VALID_DAYS,
            notes: None,
            discount_percent: None,
        }
    }

    pub fn totals(&self) -> QuoteTotals {
        QuoteTotals::compute(&self.scope_items, self.discount_percent)
    }

    pub fn into_quote(
        self,
        id: QuoteId,
        lead: &Lead,
        created_at: DateTime<Utc>,
    ) -> Result<Quote, DomainError> {
        let valid_until = validity_window(created_at, self.valid_days)?;
        Ok(Quote {
            id,
            lead_id: lead.id.clone(),
            totals: self.totals(),
            project_title: self.project_title,
            project_summary: self.project_summary,
            scope_items: self.scope_items,
            currency: self.currency,
            status: QuoteStatus::Draft,
            valid_until,
            notes: self.notes,
            decline_reason: None,
            created_at,
            sent_at: None,
            viewed_at: None,
            accepted_at: None,
            declined_at: None,
        })
    }
}

fn project_title(lead: &Lead) -> String {
    let company = lead.company.as_deref().unwrap_or("Client");
    match &lead.automation_area {
        Some(area) => format!("{} Automation for {company}", title_case(area)),
        None => format!("AI Automation Project for {company}"),
    }
}

fn scope_items(lead: &Lead) -> Vec<ScopeItem> {
    let mut items = vec![ScopeItem::fixed(
        "Discovery & Planning",
        "Requirements gathering, workflow analysis, and technical architecture planning",
        Decimal::new(2500, 0),
    )
    .hours(16)];

    if let Some(area) = &lead.automation_area {
        let area = area.to_ascii_lowercase();

        if contains_any(&area, &["chatbot", "ai", "assistant", "bot"]) {
            items.push(
                ScopeItem::fixed(
                    "AI Chatbot Development",
                    "Custom AI chatbot with natural language processing, trained on your business data",
                    Decimal::new(8500, 0),
                )
                .hours(40),
            );
        }
        if contains_any(&area, &["workflow", "process", "automation"]) {
            items.push(
                ScopeItem::fixed(
                    "Workflow Automation",
                    "End-to-end process automation with integrations, error handling, and monitoring",
                    Decimal::new(6500, 0),
                )
                .hours(32),
            );
        }
        if contains_any(&area, &["integration", "api", "sync", "connect"]) {
            items.push(
                ScopeItem::fixed(
                    "System Integration",
                    "API integrations between your existing tools and platforms",
                    Decimal::new(4500, 0),
                )
                .hours(24),
            );
        }
        if contains_any(&area, &["data", "report", "analytics", "dashboard"]) {
            items.push(
                ScopeItem::fixed(
                    "Data & Analytics",
                    "Automated reporting, data pipeline, and analytics dashboard",
                    Decimal::new(5500, 0),
                )
                .hours(28),
            );
        }
    }

    // Only discovery matched: fall back to a generic engagement.
    if items.len() == 1 {
        items.push(
            ScopeItem::fixed(
                "Custom Automation Solution",
                "Tailored automation solution based on your specific requirements",
                Decimal::new(7500, 0),
            )
            .hours(36),
        );
    }

    items.push(
        ScopeItem::fixed(
            "Testing & Deployment",
            "Quality assurance, user acceptance testing, and production deployment",
            Decimal::new(2000, 0),
        )
        .hours(12),
    );
    items.push(ScopeItem::fixed(
        "30-Day Support",
        "Post-launch support, bug fixes, and minor adjustments",
        Decimal::new(1500, 0),
    ));

    items
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
