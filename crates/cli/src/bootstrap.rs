use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use tally_agent::llm::HttpLlmClient;
use tally_agent::runtime::AgentRuntime;
use tally_core::config::{AppConfig, ConfigError, LoadOptions};
use tally_db::repositories::{SqlCustomerRepository, SqlProductRepository};
use tally_db::{connect_with_settings, migrations, DbPool};
use tally_render::PdfRenderer;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub runtime: AgentRuntime,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("llm client initialization failed: {0}")]
    Llm(#[source] anyhow::Error),
}

pub fn init_logging(config: &AppConfig) {
    use tally_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
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
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    let llm = HttpLlmClient::from_config(&config.llm).map_err(BootstrapError::Llm)?;
    let runtime = AgentRuntime::new(
        Arc::new(llm),
        Arc::new(SqlCustomerRepository::new(db_pool.clone())),
        Arc::new(SqlProductRepository::new(db_pool.clone())),
        Arc::new(PdfRenderer::new(
            config.invoice.output_dir.clone(),
            config.invoice.currency_symbol.clone(),
        )),
        config.invoice.currency_symbol.clone(),
    );

    Ok(Application { config, db_pool, runtime })
}

#[cfg(test)]
mod tests {
    use tally_core::config::{ConfigOverrides, LoadOptions};

    use super::bootstrap;

    fn overrides(database_url: &str, llm_api_key: Option<&str>) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some(database_url.to_string()),
                llm_api_key: llm_api_key.map(str::to_string),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_without_llm_credential() {
        let result = bootstrap(overrides("sqlite::memory:", None)).await;

        assert!(result.is_err());
        let message = result.err().expect("error").to_string();
        assert!(message.contains("llm.api_key"));
    }

    #[tokio::test]
    async fn bootstrap_migrates_and_exposes_lookup_tables() {
        let app = bootstrap(overrides("sqlite::memory:?cache=shared", Some("gsk-test")))
            .await
            .expect("bootstrap should succeed with valid overrides");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN ('customers', 'products')",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("expected lookup tables to be available after bootstrap");
        assert_eq!(table_count, 2, "bootstrap should expose customer and product tables");
    }
}
