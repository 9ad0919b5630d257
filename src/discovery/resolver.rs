use super::DiscoveryClient;
use crate::error::{RelayError, RelayResult};
use tracing::{debug, info};

impl DiscoveryClient {
    /// Return the first candidate, in list order, that answers `HEAD /health`.
    ///
    /// Any HTTP response counts as alive; only transport failures (refused,
    /// unreachable, timed out) move on to the next candidate.
    pub async fn resolve(&self, candidates: &[String]) -> RelayResult<String> {
        for candidate in candidates {
            let url = format!("http://{}/health", candidate);
            match self.http.head(&url).send().await {
                Ok(response) => {
                    info!(
                        "Discovery service {} is alive (status {})",
                        candidate,
                        response.status()
                    );
                    return Ok(candidate.clone());
                }
                Err(e) => {
                    debug!("Discovery service {} did not answer: {}", candidate, e);
                }
            }
        }

        Err(RelayError::NoDiscoveryServiceAvailable)
    }
}
