use axum::{
    extract::{Query, Request, State},
    http::{Method, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use std::sync::Arc;
use tower::ServiceExt;
use tracing::debug;

use super::state::AppState;
use crate::backup::isolate;

/// Parameters of the backup trigger
#[derive(Debug, Default, Deserialize)]
pub struct BackupParams {
    pub cluster: Option<String>,
}

// ============================================================================
// Backup trigger
// ============================================================================

/// `GET /backup.do?cluster=<id>`
pub async fn backup_get(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BackupParams>,
) -> Response {
    trigger(state, params.cluster).await
}

/// `POST /backup.do`; a form body value wins over the query string
pub async fn backup_post(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BackupParams>,
    form: Option<Form<BackupParams>>,
) -> Response {
    let cluster = form
        .and_then(|Form(params)| params.cluster)
        .or(query.cluster);
    trigger(state, cluster).await
}

async fn trigger(state: Arc<AppState>, cluster: Option<String>) -> Response {
    let cluster = cluster.unwrap_or_default();
    let runner = state.runner.clone();

    match isolate(async move { runner.run(&cluster).await.to_string() }).await {
        Ok(line) => line.into_response(),
        Err(fault) => (StatusCode::INTERNAL_SERVER_ERROR, fault.to_string()).into_response(),
    }
}

// ============================================================================
// Static backup files
// ============================================================================

/// Serve the backup root: directories as an HTML index, files as-is
pub async fn browse(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let readable = request.method() == Method::GET || request.method() == Method::HEAD;
    if let Some(dir) = state
        .local_path(request.uri().path())
        .filter(|_| readable)
    {
        let is_dir = tokio::fs::metadata(&dir)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if is_dir {
            return match render_listing(&dir, request.uri().path()).await {
                Ok(page) => Html(page).into_response(),
                Err(e) => {
                    debug!("Cannot list {}: {}", dir.display(), e);
                    StatusCode::NOT_FOUND.into_response()
                }
            };
        }
    }

    match state.files.clone().oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

async fn render_listing(dir: &std::path::Path, uri_path: &str) -> std::io::Result<String> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let mut name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type().await?.is_dir() {
            name.push('/');
        }
        names.push(name);
    }
    names.sort();

    let base = if uri_path.ends_with('/') {
        uri_path.to_string()
    } else {
        format!("{}/", uri_path)
    };

    let mut page = String::from("<pre>\n");
    for name in names {
        let escaped = escape_html(&name);
        page.push_str(&format!(
            "<a href=\"{}{}\">{}</a>\n",
            escape_html(&base),
            escaped,
            escaped
        ));
    }
    page.push_str("</pre>\n");
    Ok(page)
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Liveness of the relay itself
pub async fn health() -> &'static str {
    "OK"
}
