use async_trait::async_trait;
use chrono::Utc;

use super::{ConversationRepository, RepositoryError};
use crate::DbPool;

pub struct SqlConversationRepository {
    pool: DbPool,
}

impl SqlConversationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationRepository for SqlConversationRepository {
    async fn mark_completed(&self, conversation_id: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE conversations SET status = 'completed', completed_at = ? WHERE id = ?",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(conversation_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sqlx::Row;

    use super::{ConversationRepository, SqlConversationRepository};
    use crate::{connect_with_settings, migrations};

    #[tokio::test]
    async fn completion_updates_status_and_timestamp() {
        let pool = connect_with_settings("sqlite::memory:?cache=shared", 1, 30)
            .await
            .expect("connect test pool");
        migrations::run_pending(&pool).await.expect("run migrations");

        sqlx::query("INSERT INTO conversations (id, status, started_at) VALUES (?, 'active', ?)")
            .bind("conv-1")
            .bind(Utc::now().to_rfc3339())
            .execute(&pool)
            .await
            .expect("insert conversation fixture");

        let repo = SqlConversationRepository::new(pool.clone());
        repo.mark_completed("conv-1").await.expect("mark completed");

        let row = sqlx::query("SELECT status, completed_at FROM conversations WHERE id = 'conv-1'")
            .fetch_one(&pool)
            .await
            .expect("load conversation");

        assert_eq!(row.get::<String, _>("status"), "completed");
        assert!(row.get::<Option<String>, _>("completed_at").is_some());

        pool.close().await;
    }
}
