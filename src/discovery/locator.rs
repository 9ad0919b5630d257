use super::DiscoveryClient;
use crate::error::{RelayError, RelayResult};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

/// State value marking a member that can serve a backup
pub const NODE_ONLINE: &str = "ONLINE";

/// `GET /v2/keys/...` response; only the parts we read
#[derive(Debug, Deserialize)]
struct KeysResponse {
    #[serde(default)]
    node: Option<DirectoryNode>,
}

#[derive(Debug, Deserialize)]
struct DirectoryNode {
    #[serde(default)]
    nodes: Option<Vec<NodeEntry>>,
}

/// One member registration: the key ends with the member's address,
/// the value holds its state.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeEntry {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: Value,
}

impl NodeEntry {
    pub fn is_online(&self) -> bool {
        self.value.as_str() == Some(NODE_ONLINE)
    }

    /// Last path segment of the key
    pub fn address(&self) -> &str {
        match self.key.rfind('/') {
            Some(idx) => &self.key[idx + 1..],
            None => &self.key,
        }
    }
}

/// Pick the backup source from a node list.
///
/// Scans from the last entry to the first and lets every online entry
/// overwrite the previous pick, so the online entry with the smallest index
/// wins. An empty address counts as no target.
pub fn select_online(nodes: &[NodeEntry]) -> Option<String> {
    let mut target = None;
    for entry in nodes.iter().rev() {
        if entry.is_online() {
            target = Some(entry.address());
        }
    }

    target.filter(|addr| !addr.is_empty()).map(str::to_string)
}

impl DiscoveryClient {
    /// Ask `endpoint` for the node list of `cluster` and return the address
    /// of its online member.
    ///
    /// A failed query, a non-200 answer, an unparsable body or a missing
    /// node list all collapse into `NoAvailableHost`.
    pub async fn locate(&self, endpoint: &str, cluster: &str) -> RelayResult<String> {
        let nodes = match self.fetch_nodes(endpoint, cluster).await {
            Some(nodes) => nodes,
            None => return Err(RelayError::NoAvailableHost),
        };

        debug!("Cluster {} has {} registered nodes", cluster, nodes.len());

        match select_online(&nodes) {
            Some(address) => {
                info!("Cluster {} online member: {}", cluster, address);
                Ok(address)
            }
            None => Err(RelayError::NoAvailableHost),
        }
    }

    fn nodes_url(&self, endpoint: &str, cluster: &str) -> Option<Url> {
        let mut url = Url::parse(&format!("http://{}/v2/keys", endpoint)).ok()?;
        {
            let mut segments = url.path_segments_mut().ok()?;
            segments.pop_if_empty();
            for part in self.prefix.split('/').filter(|p| !p.is_empty()) {
                segments.push(part);
            }
            segments.push(cluster).push("nodes");
        }
        Some(url)
    }

    async fn fetch_nodes(&self, endpoint: &str, cluster: &str) -> Option<Vec<NodeEntry>> {
        let url = match self.nodes_url(endpoint, cluster) {
            Some(url) => url,
            None => {
                warn!("Cannot build node list URL for endpoint {}", endpoint);
                return None;
            }
        };

        let response = match self.http.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Node list query {} failed: {}", url, e);
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            warn!("Node list query {} returned {}", url, response.status());
            return None;
        }

        match response.json::<KeysResponse>().await {
            Ok(body) => body.node.and_then(|node| node.nodes),
            Err(e) => {
                warn!("Node list from {} is not readable: {}", url, e);
                None
            }
        }
    }
}
