use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row};

use leadflow_core::domain::lead::{Lead, LeadId, LeadStatus};

use super::{LeadRepository, RepositoryError};
use crate::DbPool;

pub struct SqlLeadRepository {
    pool: DbPool,
}

impl SqlLeadRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadRepository for SqlLeadRepository {
    async fn find_by_id(&self, id: &LeadId) -> Result<Option<Lead>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT
                id, name, email, company, role, phone, industry, company_size,
                website, problem_text, automation_area, tools_used, budget_range,
                timeline, urgency, interest_level, source, status, lead_score,
                created_at, updated_at, last_contact_at, converted_at
            FROM leads
            WHERE id = ?
            "#,
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|value| lead_from_row(&value)).transpose()
    }

    async fn insert(&self, lead: &Lead) -> Result<(), RepositoryError> {
        let tools_used = serde_json::to_string(&lead.tools_used)
            .map_err(|error| RepositoryError::Decode(format!("encode tools_used: {error}")))?;

        sqlx::query(
            r#"
            INSERT INTO leads (
                id, name, email, company, role, phone, industry, company_size,
                website, problem_text, automation_area, tools_used, budget_range,
                timeline, urgency, interest_level, source, status, lead_score,
                created_at, updated_at, last_contact_at, converted_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&lead.id.0)
        .bind(lead.name.as_deref())
        .bind(lead.email.as_deref())
        .bind(lead.company.as_deref())
        .bind(lead.role.as_deref())
        .bind(lead.phone.as_deref())
        .bind(lead.industry.as_deref())
        .bind(lead.company_size.as_deref())
        .bind(lead.website.as_deref())
        .bind(lead.problem_text.as_deref())
        .bind(lead.automation_area.as_deref())
        .bind(tools_used)
        .bind(lead.budget_range.as_deref())
        .bind(lead.timeline.as_deref())
        .bind(lead.urgency.as_deref())
        .bind(lead.interest_level.map(i64::from))
        .bind(&lead.source)
        .bind(lead.status.as_str())
        .bind(lead.lead_score.map(i64::from))
        .bind(lead.created_at.to_rfc3339())
        .bind(lead.updated_at.map(|value| value.to_rfc3339()))
        .bind(lead.last_contact_at.map(|value| value.to_rfc3339()))
        .bind(lead.converted_at.map(|value| value.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_score(
        &self,
        id: &LeadId,
        score_total: u8,
        status: Option<LeadStatus>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE leads
             SET lead_score = ?, status = COALESCE(?, status), updated_at = ?
             WHERE id = ?",
        )
        .bind(i64::from(score_total))
        .bind(status.map(|value| value.as_str()))
        .bind(Utc::now().to_rfc3339())
        .bind(&id.0)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_status(
        &self,
        id: &LeadId,
        status: LeadStatus,
    ) -> Result<(), RepositoryError> {
        let now = Utc::now().to_rfc3339();
        let converted_at = matches!(status, LeadStatus::Converted).then(|| now.clone());

        sqlx::query(
            "UPDATE leads
             SET status = ?, last_contact_at = ?, updated_at = ?,
                 converted_at = COALESCE(?, converted_at)
             WHERE id = ?",
        )
        .bind(status.as_str())
        .bind(&now)
        .bind(&now)
        .bind(converted_at)
        .bind(&id.0)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn lead_from_row(row: &SqliteRow) -> Result<Lead, RepositoryError> {
    let status_raw: String = row.try_get("status")?;
    let status = LeadStatus::parse(&status_raw)
        .ok_or_else(|| RepositoryError::Decode(format!("invalid lead status: {status_raw}")))?;

    let tools_raw: String = row.try_get("tools_used")?;
    let tools_used: Vec<String> = serde_json::from_str(&tools_raw)
        .map_err(|error| RepositoryError::Decode(format!("invalid tools_used json: {error}")))?;

    Ok(Lead {
        id: LeadId(row.try_get("id")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        company: row.try_get("company")?,
        role: row.try_get("role")?,
        phone: row.try_get("phone")?,
        industry: row.try_get("industry")?,
        company_size: row.try_get("company_size")?,
        website: row.try_get("website")?,
        problem_text: row.try_get("problem_text")?,
        automation_area: row.try_get("automation_area")?,
        tools_used,
        budget_range: row.try_get("budget_range")?,
        timeline: row.try_get("timeline")?,
        urgency: row.try_get("urgency")?,
        interest_level: row.try_get::<Option<i64>, _>("interest_level")?.map(|value| value as u8),
        source: row.try_get("source")?,
        status,
        lead_score: row.try_get::<Option<i64>, _>("lead_score")?.map(|value| value as u8),
        created_at: parse_rfc3339("lead created_at", &row.try_get::<String, _>("created_at")?)?,
        updated_at: parse_optional_ts(row, "updated_at")?,
        last_contact_at: parse_optional_ts(row, "last_contact_at")?,
        converted_at: parse_optional_ts(row, "converted_at")?,
    })
}

fn parse_optional_ts(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<DateTime<Utc>>, RepositoryError> {
    row.try_get::<Option<String>, _>(column)?
        .as_deref()
        .map(|value| parse_rfc3339(column, value))
        .transpose()
}

pub(crate) fn parse_rfc3339(field: &str, value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value).map(|ts| ts.with_timezone(&Utc)).map_err(|err| {
        RepositoryError::Decode(format!("invalid {field} timestamp '{value}': {err}"))
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use leadflow_core::domain::lead::{Lead, LeadId, LeadStatus};

    use super::{LeadRepository, SqlLeadRepository};
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup_pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:?cache=shared", 1, 30)
            .await
            .expect("connect test pool");
        migrations::run_pending(&pool).await.expect("run migrations");
        pool
    }

    fn lead_fixture(id: &str) -> Lead {
        let mut lead = Lead::new(LeadId(id.to_string()), Utc::now());
        lead.name = Some("Grace Hopper".to_string());
        lead.email = Some("grace@example.com".to_string());
        lead.company = Some("Flowmatic".to_string());
        lead.role = Some("CTO".to_string());
        lead.problem_text = Some("We spend two days a week re-keying invoices".to_string());
        lead.tools_used = vec!["Slack".to_string(), "Xero".to_string()];
        lead.interest_level = Some(8);
        lead
    }

    #[tokio::test]
    async fn insert_and_find_round_trips_all_fields() {
        let pool = setup_pool().await;
        let repo = SqlLeadRepository::new(pool.clone());
        let lead = lead_fixture("lead-100");

        repo.insert(&lead).await.expect("insert lead");

        let loaded = repo
            .find_by_id(&lead.id)
            .await
            .expect("find lead")
            .expect("lead should exist");

        assert_eq!(loaded.name, lead.name);
        assert_eq!(loaded.tools_used, lead.tools_used);
        assert_eq!(loaded.interest_level, Some(8));
        assert_eq!(loaded.status, LeadStatus::New);
        assert_eq!(loaded.lead_score, None);

        pool.close().await;
    }

    #[tokio::test]
    async fn find_missing_lead_returns_none() {
        let pool = setup_pool().await;
        let repo = SqlLeadRepository::new(pool.clone());

        let loaded =
            repo.find_by_id(&LeadId("absent".to_string())).await.expect("query should succeed");
        assert!(loaded.is_none());

        pool.close().await;
    }

    #[tokio::test]
    async fn update_score_records_score_and_optional_status() {
        let pool = setup_pool().await;
        let repo = SqlLeadRepository::new(pool.clone());
        let lead = lead_fixture("lead-101");
        repo.insert(&lead).await.expect("insert lead");

        repo.update_score(&lead.id, 84, Some(LeadStatus::Qualified))
            .await
            .expect("update score");

        let loaded = repo.find_by_id(&lead.id).await.expect("find").expect("exists");
        assert_eq!(loaded.lead_score, Some(84));
        assert_eq!(loaded.status, LeadStatus::Qualified);
        assert!(loaded.updated_at.is_some());

        // Low-quality routing: score only, status untouched.
        repo.update_score(&lead.id, 12, None).await.expect("update score only");
        let loaded = repo.find_by_id(&lead.id).await.expect("find").expect("exists");
        assert_eq!(loaded.lead_score, Some(12));
        assert_eq!(loaded.status, LeadStatus::Qualified);

        pool.close().await;
    }

    #[tokio::test]
    async fn conversion_stamps_converted_at() {
        let pool = setup_pool().await;
        let repo = SqlLeadRepository::new(pool.clone());
        let lead = lead_fixture("lead-102");
        repo.insert(&lead).await.expect("insert lead");

        repo.update_status(&lead.id, LeadStatus::Nurture).await.expect("nurture");
        let loaded = repo.find_by_id(&lead.id).await.expect("find").expect("exists");
        assert_eq!(loaded.status, LeadStatus::Nurture);
        assert!(loaded.last_contact_at.is_some());
        assert!(loaded.converted_at.is_none());

        repo.update_status(&lead.id, LeadStatus::Converted).await.expect("convert");
        let loaded = repo.find_by_id(&lead.id).await.expect("find").expect("exists");
        assert_eq!(loaded.status, LeadStatus::Converted);
        assert!(loaded.converted_at.is_some());

        pool.close().await;
    }
}
