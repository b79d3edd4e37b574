use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use leadflow_agent::{ChatCompletionClient, LeadProcessor, LeadScorer};
use leadflow_core::config::{AppConfig, ConfigError, LoadOptions};
use leadflow_db::{
    connect_with_settings, migrations, DbPool, SqlConversationRepository, SqlLeadRepository,
    SqlQuoteRepository,
};
use leadflow_email::{EmailService, NoopEmailSender, ResendSender};
use leadflow_slack::{NoopNotificationSender, SlackWebhookSender};

use crate::webhooks::AppState;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("service initialization failed: {0}")]
    Service(anyhow::Error),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    let state = build_state(&config, db_pool.clone())?;
    info!(
        event_name = "system.bootstrap.services_ready",
        llm_configured = config.llm.is_configured(),
        email_configured = config.email.is_configured(),
        slack_configured = config.slack.is_configured(),
        webhook_signatures = config.webhook.is_configured(),
        "services initialized"
    );

    Ok(Application { config, db_pool, state })
}

fn build_state(config: &AppConfig, db_pool: DbPool) -> Result<AppState, BootstrapError> {
    let leads = Arc::new(SqlLeadRepository::new(db_pool.clone()));
    let quotes = Arc::new(SqlQuoteRepository::new(db_pool.clone()));
    let conversations = Arc::new(SqlConversationRepository::new(db_pool));

    let scorer = if config.llm.is_configured() {
        let client =
            ChatCompletionClient::from_config(&config.llm).map_err(BootstrapError::Service)?;
        LeadScorer::with_model(Arc::new(client))
    } else {
        LeadScorer::rule_based_only()
    };

    let thresholds = config.scoring.thresholds();
    let processor = Arc::new(LeadProcessor::new(leads.clone(), scorer, thresholds));

    let email_sender: Arc<dyn leadflow_email::EmailSender> = match &config.email.api_key {
        Some(api_key) if config.email.is_configured() => {
            Arc::new(ResendSender::new(api_key.clone(), config.email.from_email.clone()))
        }
        _ => Arc::new(NoopEmailSender),
    };
    let email = Arc::new(
        EmailService::new(email_sender, config.email.team_notification_email.clone())
            .map_err(BootstrapError::Service)?,
    );

    let notifier: Arc<dyn leadflow_slack::NotificationSender> = match &config.slack.webhook_url {
        Some(webhook_url) if config.slack.is_configured() => Arc::new(SlackWebhookSender::new(
            webhook_url.clone(),
            Some(config.slack.channel.clone()),
        )),
        _ => Arc::new(NoopNotificationSender),
    };

    Ok(AppState {
        processor,
        leads,
        quotes,
        conversations,
        email,
        notifier,
        webhook_secret: config.webhook.secret.clone(),
        thresholds,
    })
}

#[cfg(test)]
mod tests {
    use leadflow_core::config::{ConfigOverrides, LoadOptions};

    use super::bootstrap;

    fn options(database_url: &str) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some(database_url.to_string()),
                webhook_secret: Some("test-secret".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_connects_migrates_and_wires_services() {
        let app = bootstrap(options("sqlite::memory:?cache=shared"))
            .await
            .expect("bootstrap should succeed");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN ('leads', 'quotes', 'conversations')",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("foundation tables should exist after bootstrap");
        assert_eq!(table_count, 3);

        assert!(app.state.webhook_secret.is_some());
        assert_eq!(app.state.thresholds.qualified, 70);

        app.db_pool.close().await;
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_on_invalid_database_url() {
        let result = bootstrap(options("postgres://not-sqlite")).await;
        assert!(result.is_err());
        let message = result.err().expect("error").to_string();
        assert!(message.contains("database.url"));
    }
}
