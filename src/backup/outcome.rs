use crate::capture::CaptureReport;
use crate::error::RelayError;
use std::fmt;

/// Result of one backup request, rendered as a single text line
#[derive(Debug)]
pub enum BackupOutcome {
    /// Stopped before a member was contacted (bad id, discovery failure)
    Rejected(RelayError),
    /// Member was chosen but the capture could not start
    Failed {
        host: String,
        cluster: String,
        error: RelayError,
    },
    /// Stream was captured; `report.end` says how it ended
    Completed {
        host: String,
        cluster: String,
        report: CaptureReport,
    },
}

impl BackupOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, BackupOutcome::Completed { .. })
    }
}

impl fmt::Display for BackupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupOutcome::Rejected(error) => write!(f, "{}", error),
            BackupOutcome::Failed {
                host,
                cluster,
                error,
            } => write!(f, "Backup From {} For {} Failed: {}", host, cluster, error),
            BackupOutcome::Completed {
                host,
                cluster,
                report,
            } => write!(
                f,
                "Backup From {} For {} To {} Done, Backup State: {}, File Size: {}",
                host,
                cluster,
                report.path.display(),
                report.end,
                report.bytes
            ),
        }
    }
}
