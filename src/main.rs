//! bookmarkd service binary

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookmarkd::{routes, AppState, Config, SqliteStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookmarkd=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    tracing::info!(?config, "Loaded configuration");

    // One store handle backs all four collections
    let store = Arc::new(
        SqliteStore::open(&config.database_path)
            .map_err(|e| anyhow::anyhow!("failed to open database: {e}"))?,
    );

    let state = Arc::new(AppState::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store,
    ));

    let app = routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
