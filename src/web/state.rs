//! Shared state for the HTTP server

use crate::backup::BackupRunner;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tower_http::services::ServeDir;

/// Application state shared across all handlers.
///
/// Everything in here is read-only after startup.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Backup pipeline
    pub runner: Arc<BackupRunner>,
    /// Read-only file service over the backup root
    pub files: ServeDir,
}

impl AppState {
    pub fn new(runner: Arc<BackupRunner>) -> Self {
        let files = ServeDir::new(&runner.config().backup_root);
        Self { runner, files }
    }

    pub fn backup_root(&self) -> &Path {
        &self.runner.config().backup_root
    }

    /// Map a request path onto the backup root.
    ///
    /// Returns `None` for paths that would leave the root or that carry
    /// percent-escapes (those go straight to the file service).
    pub fn local_path(&self, uri_path: &str) -> Option<PathBuf> {
        if uri_path.contains('%') || uri_path.contains('\\') {
            return None;
        }

        let relative = Path::new(uri_path.trim_start_matches('/'));
        let mut path = self.backup_root().to_path_buf();
        for component in relative.components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(path)
    }
}
