//! Web server setup and routing

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;
use super::state::AppState;
use crate::backup::BackupRunner;
use crate::cli::RelayConfig;

/// Build the router: the backup trigger plus read-only access to the
/// backup root for every other path
pub fn router(runner: Arc<BackupRunner>) -> Router {
    let state = Arc::new(AppState::new(runner));

    Router::new()
        .route(
            "/backup.do",
            get(handlers::backup_get).post(handlers::backup_post),
        )
        .route("/health", get(handlers::health))
        .fallback(handlers::browse)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the relay HTTP server
pub async fn start_server(config: Arc<RelayConfig>) -> anyhow::Result<()> {
    let runner = Arc::new(BackupRunner::new(config.clone())?);

    if let Err(e) = tokio::fs::create_dir_all(&config.backup_root).await {
        tracing::warn!(
            "Failed to create backup root {}: {}",
            config.backup_root.display(),
            e
        );
    }

    let app = router(runner);

    let addr = config.listen_addr();
    info!("Starting backup relay on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
