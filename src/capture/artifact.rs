//! Backup file naming and creation
//!
//! Layout: `<root>/<cluster>/<YYYY-MM-DD_HH-MM-SS>.xbstream`. When two
//! captures of the same cluster start within the same second the later one
//! gets a numeric suffix (`<ts>.1.xbstream`), so an existing backup is
//! never truncated.

use crate::error::{RelayError, RelayResult};
use chrono::NaiveDateTime;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};

pub const ARTIFACT_EXTENSION: &str = "xbstream";

/// Second-resolution timestamp used as the file stem
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Give up on suffixes after this many same-second collisions
const MAX_COLLISIONS: u32 = 1000;

/// Check that a cluster identifier is usable as a single path segment.
pub fn validate_cluster(cluster: &str) -> RelayResult<()> {
    let reason = if cluster.is_empty() {
        "empty cluster name"
    } else if cluster == "." || cluster == ".." {
        "relative path component"
    } else if cluster.contains(['/', '\\']) {
        "path separator in cluster name"
    } else if cluster.contains('\0') {
        "NUL byte in cluster name"
    } else {
        return Ok(());
    };

    Err(RelayError::InvalidCluster(reason.to_string()))
}

/// File name for a capture started at `at`; `attempt` > 0 adds a suffix
pub fn artifact_name(at: NaiveDateTime, attempt: u32) -> String {
    let stamp = at.format(TIMESTAMP_FORMAT);
    match attempt {
        0 => format!("{}.{}", stamp, ARTIFACT_EXTENSION),
        n => format!("{}.{}.{}", stamp, n, ARTIFACT_EXTENSION),
    }
}

/// Create `<root>/<cluster>` if needed and open a fresh artifact in it.
pub async fn create_artifact(
    root: &Path,
    cluster: &str,
    at: NaiveDateTime,
) -> RelayResult<(PathBuf, File)> {
    let dir = root.join(cluster);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|source| RelayError::Storage {
            path: dir.clone(),
            source,
        })?;

    for attempt in 0..MAX_COLLISIONS {
        let path = dir.join(artifact_name(at, attempt));
        match OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(source) => return Err(RelayError::Storage { path, source }),
        }
    }

    Err(RelayError::Storage {
        path: dir.join(artifact_name(at, 0)),
        source: io::Error::new(io::ErrorKind::AlreadyExists, "too many backups in one second"),
    })
}
