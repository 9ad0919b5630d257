//! Domain errors surfaced to callers of the backup trigger.
//!
//! The `Display` text of each variant is what ends up in the plain-text
//! response body, so keep the wording stable.

use std::io;
use std::path::PathBuf;

/// Errors raised while sequencing a backup request
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// None of the configured discovery endpoints answered the liveness check
    #[error("No Available Discovery Service.")]
    NoDiscoveryServiceAvailable,

    /// Discovery answered but no member of the cluster is marked online
    #[error("No Available Etcd Host.")]
    NoAvailableHost,

    /// Cluster identifier cannot be used as a path segment
    #[error("Invalid Cluster: {0}")]
    InvalidCluster(String),

    /// Capture connection to the selected member could not be opened
    #[error("connect to {address} failed: {source}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },

    /// Backup directory or file could not be created
    #[error("cannot create {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Request handling died before producing an outcome
    #[error("Unexpected Fault.")]
    UnexpectedFault(String),
}

pub type RelayResult<T> = Result<T, RelayError>;
