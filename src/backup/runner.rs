use super::BackupOutcome;
use crate::capture::{validate_cluster, StreamCapturer};
use crate::cli::RelayConfig;
use crate::discovery::DiscoveryClient;
use crate::error::{RelayError, RelayResult};
use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info, Instrument};
use uuid::Uuid;

/// Runs the backup pipeline for one cluster at a time.
///
/// Holds only read-only configuration and clients; concurrent requests
/// share nothing mutable.
#[derive(Debug, Clone)]
pub struct BackupRunner {
    config: Arc<RelayConfig>,
    discovery: DiscoveryClient,
    capturer: StreamCapturer,
}

impl BackupRunner {
    pub fn new(config: Arc<RelayConfig>) -> Result<Self> {
        let discovery = DiscoveryClient::new(config.discovery_timeout(), &config.discovery_prefix)?;
        let capturer = StreamCapturer::new(&config);

        Ok(Self {
            config,
            discovery,
            capturer,
        })
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Run resolve -> locate -> capture for `cluster`
    pub async fn run(&self, cluster: &str) -> BackupOutcome {
        let span = tracing::info_span!(
            "backup",
            request_id = %Uuid::new_v4(),
            cluster = %cluster
        );

        let outcome = self.execute(cluster).instrument(span.clone()).await;
        span.in_scope(|| info!("{}", outcome));
        outcome
    }

    async fn execute(&self, cluster: &str) -> BackupOutcome {
        info!("Start backup for cluster {}", cluster);

        if let Err(e) = validate_cluster(cluster) {
            return BackupOutcome::Rejected(e);
        }

        let endpoint = match self
            .discovery
            .resolve(&self.config.discovery_candidates())
            .await
        {
            Ok(endpoint) => endpoint,
            Err(e) => return BackupOutcome::Rejected(e),
        };

        let host = match self.discovery.locate(&endpoint, cluster).await {
            Ok(host) => host,
            Err(e) => return BackupOutcome::Rejected(e),
        };
        info!(
            "Cluster host is {}, port is {}",
            host, self.config.capture_port
        );

        match self.capturer.capture(&host, cluster).await {
            Ok(report) => BackupOutcome::Completed {
                host,
                cluster: cluster.to_string(),
                report,
            },
            Err(error) => BackupOutcome::Failed {
                host,
                cluster: cluster.to_string(),
                error,
            },
        }
    }
}

/// Run `task` on its own tokio task so a panic inside it is reported as
/// `UnexpectedFault` instead of tearing down the caller.
pub async fn isolate<F>(task: F) -> RelayResult<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(task).await.map_err(|e| {
        let detail = if e.is_panic() {
            let payload = e.into_panic();
            payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic".to_string())
        } else {
            e.to_string()
        };
        error!("Unexpected fault while handling backup: {}", detail);
        RelayError::UnexpectedFault(detail)
    })
}
