use tracing::info;

use jobjet::db::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "jobjet=debug,sqlx=warn".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = AppState::init().await?;
    db::apply_schema(&state.db).await?;

    let active = state.accounts.count_active().await?;
    info!(
        active,
        sign_in_url = %state.config.endpoint.sign_in_url(),
        register_url = %state.config.endpoint.register_url(),
        "users table ready"
    );

    Ok(())
}
