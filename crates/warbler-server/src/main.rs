mod config;

use std::sync::Arc;

use tracing::info;

use warbler_api::auth::{AppState, AppStateInner};
use warbler_api::build_router;

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warbler=debug,warbler_api=debug,warbler_db=debug,tower_http=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env();
    info!(db_path = %config.db_path.display(), session_days = config.session_days, "Loaded configuration");

    // Init database
    let db = warbler_db::Database::open(&config.db_path)?;

    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret: config.secret_key.clone(),
        session_days: config.session_days,
    });

    let app = build_router(state);

    let addr = config.addr();
    info!("Warbler listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
