use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::accounts::{AccountRepo, PgAccountRepo};
use crate::config::AppConfig;
use crate::intake::{AuthEndpoint, HttpAuthEndpoint};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub accounts: Arc<dyn AccountRepo>,
    pub endpoint: Arc<dyn AuthEndpoint>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = connect(&config).await?;
        let accounts = Arc::new(PgAccountRepo::new(db.clone())) as Arc<dyn AccountRepo>;
        let endpoint = Arc::new(
            HttpAuthEndpoint::new(&config.endpoint).context("build auth endpoint client")?,
        ) as Arc<dyn AuthEndpoint>;
        Ok(Self {
            db,
            config,
            accounts,
            endpoint,
        })
    }
}

pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("connect to database")
}

/// Creates the `users` table and its active-row unique indexes if missing.
pub async fn apply_schema(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("apply users schema")?;
    Ok(())
}
