use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::lead::LeadId;
use crate::errors::DomainError;

pub const DEFAULT_VALID_DAYS: i64 = 30;
pub const MAX_VALID_DAYS: i64 = 90;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Viewed,
    Accepted,
    Declined,
    Expired,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Viewed => "viewed",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Expired => "expired",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "sent" => Some(Self::Sent),
            "viewed" => Some(Self::Viewed),
            "accepted" => Some(Self::Accepted),
            "declined" => Some(Self::Declined),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingUnit {
    Fixed,
    Hourly,
    Monthly,
}

/// A single line of scope in a quote.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScopeItem {
    pub title: String,
    pub description: String,
    pub amount: Decimal,
    pub hours: Option<u32>,
    pub unit: BillingUnit,
}

impl ScopeItem {
    pub fn fixed(title: impl Into<String>, description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            amount,
            hours: None,
            unit: BillingUnit::Fixed,
        }
    }

    pub fn hours(mut self, hours: u32) -> Self {
        self.hours = Some(hours);
        self
    }
}

/// Derived money breakdown for a set of scope items.
///
/// Tax is 10% GST on the discounted subtotal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteTotals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
}

pub const GST_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

impl QuoteTotals {
    pub fn compute(items: &[ScopeItem], discount_percent: Option<Decimal>) -> Self {
        let subtotal: Decimal = items.iter().map(|item| item.amount).sum();
        let discount_amount = discount_percent
            .map(|pct| subtotal * pct / Decimal::ONE_HUNDRED)
            .unwrap_or(Decimal::ZERO);
        let taxable = subtotal - discount_amount;
        let tax_amount = taxable * GST_RATE;
        Self { subtotal, discount_amount, tax_amount, total_amount: taxable + tax_amount }
    }
}

/// A quote owned by a lead. One lead can hold several quotes over time; only
/// the latest is typically active.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub lead_id: LeadId,
    pub project_title: String,
    pub project_summary: String,
    pub scope_items: Vec<ScopeItem>,
    pub totals: QuoteTotals,
    pub currency: String,
    pub status: QuoteStatus,
    pub valid_until: DateTime<Utc>,
    pub notes: Option<String>,
    pub decline_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub viewed_at: Option<DateTime<Utc>>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub declined_at: Option<DateTime<Utc>>,
}

impl Quote {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.valid_until
    }

    /// Active quotes are still awaiting a decision.
    pub fn is_active(&self) -> bool {
        matches!(self.status, QuoteStatus::Draft | QuoteStatus::Sent | QuoteStatus::Viewed)
    }
}

/// Validate a requested validity window before building a quote.
pub fn validity_window(
    created_at: DateTime<Utc>,
    valid_days: i64,
) -> Result<DateTime<Utc>, DomainError> {
    if !(1..=MAX_VALID_DAYS).contains(&valid_days) {
        return Err(DomainError::InvariantViolation(format!(
            "quote validity must be 1..={MAX_VALID_DAYS} days, got {valid_days}"
        )));
    }
    Ok(created_at + chrono::Duration::days(valid_days))
}
