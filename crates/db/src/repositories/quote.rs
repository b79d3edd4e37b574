use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};

use leadflow_core::domain::lead::LeadId;
use leadflow_core::domain::quote::{Quote, QuoteId, QuoteStatus, QuoteTotals, ScopeItem};

use super::lead::parse_rfc3339;
use super::{QuoteRepository, RepositoryError};
use crate::DbPool;

/// A quote joined with the owning lead's contact fields, as needed by the
/// accepted/declined notification paths.
#[derive(Clone, Debug, PartialEq)]
pub struct QuoteWithLead {
    pub quote: Quote,
    pub lead_name: Option<String>,
    pub lead_email: Option<String>,
    pub lead_company: Option<String>,
}

pub struct SqlQuoteRepository {
    pool: DbPool,
}

impl SqlQuoteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuoteRepository for SqlQuoteRepository {
    async fn insert(&self, quote: &Quote) -> Result<(), RepositoryError> {
        let scope_items = serde_json::to_string(&quote.scope_items)
            .map_err(|error| RepositoryError::Decode(format!("encode scope_items: {error}")))?;

        sqlx::query(
            r#"
            INSERT INTO quotes (
                id, lead_id, project_title, project_summary, scope_items,
                subtotal, discount_amount, tax_amount, total_amount, currency,
                status, valid_until, notes, decline_reason, created_at,
                sent_at, viewed_at, accepted_at, declined_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&quote.id.0)
        .bind(&quote.lead_id.0)
        .bind(&quote.project_title)
        .bind(&quote.project_summary)
        .bind(scope_items)
        .bind(quote.totals.subtotal.to_string())
        .bind(quote.totals.discount_amount.to_string())
        .bind(quote.totals.tax_amount.to_string())
        .bind(quote.totals.total_amount.to_string())
        .bind(&quote.currency)
        .bind(quote.status.as_str())
        .bind(quote.valid_until.to_rfc3339())
        .bind(quote.notes.as_deref())
        .bind(quote.decline_reason.as_deref())
        .bind(quote.created_at.to_rfc3339())
        .bind(quote.sent_at.map(|value| value.to_rfc3339()))
        .bind(quote.viewed_at.map(|value| value.to_rfc3339()))
        .bind(quote.accepted_at.map(|value| value.to_rfc3339()))
        .bind(quote.declined_at.map(|value| value.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_with_lead(
        &self,
        id: &QuoteId,
    ) -> Result<Option<QuoteWithLead>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT
                q.id, q.lead_id, q.project_title, q.project_summary, q.scope_items,
                q.subtotal, q.discount_amount, q.tax_amount, q.total_amount, q.currency,
                q.status, q.valid_until, q.notes, q.decline_reason, q.created_at,
                q.sent_at, q.viewed_at, q.accepted_at, q.declined_at,
                l.name AS lead_name, l.email AS lead_email, l.company AS lead_company
            FROM quotes q
            LEFT JOIN leads l ON q.lead_id = l.id
            WHERE q.id = ?
            "#,
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|value| quote_with_lead_from_row(&value)).transpose()
    }

    async fn update_status(
        &self,
        id: &QuoteId,
        status: QuoteStatus,
        reason: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let now = Utc::now().to_rfc3339();
        let timestamp_column = match status {
            QuoteStatus::Sent => Some("sent_at"),
            QuoteStatus::Viewed => Some("viewed_at"),
            QuoteStatus::Accepted => Some("accepted_at"),
            QuoteStatus::Declined => Some("declined_at"),
            QuoteStatus::Draft | QuoteStatus::Expired => None,
        };

        // Column name comes from the fixed match above, never from input.
        let query = match timestamp_column {
            Some(column) => format!(
                "UPDATE quotes SET status = ?, decline_reason = COALESCE(?, decline_reason), \
                 {column} = ? WHERE id = ?"
            ),
            None => "UPDATE quotes SET status = ?, decline_reason = COALESCE(?, decline_reason) \
                     WHERE id = ?"
                .to_string(),
        };

        let mut statement = sqlx::query(&query).bind(status.as_str()).bind(reason);
        if timestamp_column.is_some() {
            statement = statement.bind(&now);
        }
        statement.bind(&id.0).execute(&self.pool).await?;

        Ok(())
    }
}

fn quote_with_lead_from_row(row: &SqliteRow) -> Result<QuoteWithLead, RepositoryError> {
    let status_raw: String = row.try_get("status")?;
    let status = QuoteStatus::parse(&status_raw)
        .ok_or_else(|| RepositoryError::Decode(format!("invalid quote status: {status_raw}")))?;

    let scope_raw: String = row.try_get("scope_items")?;
    let scope_items: Vec<ScopeItem> = serde_json::from_str(&scope_raw)
        .map_err(|error| RepositoryError::Decode(format!("invalid scope_items json: {error}")))?;

    let quote = Quote {
        id: QuoteId(row.try_get("id")?),
        lead_id: LeadId(row.try_get("lead_id")?),
        project_title: row.try_get("project_title")?,
        project_summary: row.try_get("project_summary")?,
        scope_items,
        totals: QuoteTotals {
            subtotal: parse_money(row, "subtotal")?,
            discount_amount: parse_money(row, "discount_amount")?,
            tax_amount: parse_money(row, "tax_amount")?,
            total_amount: parse_money(row, "total_amount")?,
        },
        currency: row.try_get("currency")?,
        status,
        valid_until: parse_rfc3339("quote valid_until", &row.try_get::<String, _>("valid_until")?)?,
        notes: row.try_get("notes")?,
        decline_reason: row.try_get("decline_reason")?,
        created_at: parse_rfc3339("quote created_at", &row.try_get::<String, _>("created_at")?)?,
        sent_at: parse_optional_ts(row, "sent_at")?,
        viewed_at: parse_optional_ts(row, "viewed_at")?,
        accepted_at: parse_optional_ts(row, "accepted_at")?,
        declined_at: parse_optional_ts(row, "declined_at")?,
    };

    Ok(QuoteWithLead {
        quote,
        lead_name: row.try_get("lead_name")?,
        lead_email: row.try_get("lead_email")?,
        lead_company: row.try_get("lead_company")?,
    })
}

fn parse_money(row: &SqliteRow, column: &str) -> Result<Decimal, RepositoryError> {
    let raw: String = row.try_get(column)?;
    raw.parse::<Decimal>()
        .map_err(|error| RepositoryError::Decode(format!("invalid {column} amount '{raw}': {error}")))
}

fn parse_optional_ts(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<chrono::DateTime<Utc>>, RepositoryError> {
    row.try_get::<Option<String>, _>(column)?
        .as_deref()
        .map(|value| parse_rfc3339(column, value))
        .transpose()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use leadflow_core::domain::lead::{Lead, LeadId};
    use leadflow_core::domain::quote::{QuoteId, QuoteStatus};
    use leadflow_core::quotes::QuoteDraft;

    use super::super::lead::SqlLeadRepository;
    use super::super::LeadRepository;
    use super::{QuoteRepository, SqlQuoteRepository};
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup_pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:?cache=shared", 1, 30)
            .await
            .expect("connect test pool");
        migrations::run_pending(&pool).await.expect("run migrations");
        pool
    }

    async fn insert_lead(pool: &DbPool, id: &str) -> Lead {
        let mut lead = Lead::new(LeadId(id.to_string()), Utc::now());
        lead.name = Some("Margaret".to_string());
        lead.email = Some("margaret@example.com".to_string());
        lead.company = Some("Apollo Logistics".to_string());
        lead.automation_area = Some("workflow automation".to_string());
        lead.problem_text = Some("Dispatch planning is fully manual today".to_string());

        SqlLeadRepository::new(pool.clone()).insert(&lead).await.expect("insert lead fixture");
        lead
    }

    #[tokio::test]
    async fn insert_and_join_returns_quote_with_lead_contact() {
        let pool = setup_pool().await;
        let lead = insert_lead(&pool, "lead-200").await;
        let repo = SqlQuoteRepository::new(pool.clone());

        let quote = QuoteDraft::for_lead(&lead)
            .into_quote(QuoteId("qt-200".to_string()), &lead, Utc::now())
            .expect("draft converts");
        repo.insert(&quote).await.expect("insert quote");

        let loaded = repo
            .find_with_lead(&quote.id)
            .await
            .expect("find quote")
            .expect("quote should exist");

        assert_eq!(loaded.quote.id, quote.id);
        assert_eq!(loaded.quote.scope_items, quote.scope_items);
        assert_eq!(loaded.quote.totals, quote.totals);
        assert_eq!(loaded.lead_name.as_deref(), Some("Margaret"));
        assert_eq!(loaded.lead_company.as_deref(), Some("Apollo Logistics"));

        pool.close().await;
    }

    #[tokio::test]
    async fn acceptance_stamps_accepted_at() {
        let pool = setup_pool().await;
        let lead = insert_lead(&pool, "lead-201").await;
        let repo = SqlQuoteRepository::new(pool.clone());

        let quote = QuoteDraft::for_lead(&lead)
            .into_quote(QuoteId("qt-201".to_string()), &lead, Utc::now())
            .expect("draft converts");
        repo.insert(&quote).await.expect("insert quote");

        repo.update_status(&quote.id, QuoteStatus::Accepted, None).await.expect("accept");

        let loaded = repo.find_with_lead(&quote.id).await.expect("find").expect("exists");
        assert_eq!(loaded.quote.status, QuoteStatus::Accepted);
        assert!(loaded.quote.accepted_at.is_some());
        assert!(loaded.quote.declined_at.is_none());

        pool.close().await;
    }

    #[tokio::test]
    async fn decline_records_the_reason() {
        let pool = setup_pool().await;
        let lead = insert_lead(&pool, "lead-202").await;
        let repo = SqlQuoteRepository::new(pool.clone());

        let quote = QuoteDraft::for_lead(&lead)
            .into_quote(QuoteId("qt-202".to_string()), &lead, Utc::now())
            .expect("draft converts");
        repo.insert(&quote).await.expect("insert quote");

        repo.update_status(&quote.id, QuoteStatus::Declined, Some("budget cut"))
            .await
            .expect("decline");

        let loaded = repo.find_with_lead(&quote.id).await.expect("find").expect("exists");
        assert_eq!(loaded.quote.status, QuoteStatus::Declined);
        assert_eq!(loaded.quote.decline_reason.as_deref(), Some("budget cut"));
        assert!(loaded.quote.declined_at.is_some());

        pool.close().await;
    }

    #[tokio::test]
    async fn find_missing_quote_returns_none() {
        let pool = setup_pool().await;
        let repo = SqlQuoteRepository::new(pool.clone());

        let loaded = repo
            .find_with_lead(&QuoteId("absent".to_string()))
            .await
            .expect("query should succeed");
        assert!(loaded.is_none());

        pool.close().await;
    }
}
