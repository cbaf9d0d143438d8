use std::sync::Arc;

use anyhow::Context;
use server::config::Config;
use server::db::{self, postgres::PgStore};
use server::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();

    let state = match config.database_url.clone() {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let pool = db::pool::create_pool(&url)
                .await
                .context("Failed to connect to database")?;

            tracing::info!("Running migrations...");
            db::pool::run_migrations(&pool)
                .await
                .context("Failed to run migrations")?;

            let store = Arc::new(PgStore::new(pool));
            AppState::new(config.clone(), store.clone(), store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set - using in-memory storage");
            AppState::in_memory(config.clone())
        }
    };

    let app = server::build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
