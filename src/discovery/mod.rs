//! Discovery service access
//!
//! Two steps run against the discovery directory for every backup request:
//! 1. `resolve` - pick the first endpoint that answers a liveness check
//! 2. `locate` - read the cluster's node list and choose the online member
//!
//! Nothing is cached; every request resolves and locates afresh.

mod locator;
mod resolver;

pub use locator::{select_online, NodeEntry, NODE_ONLINE};

use anyhow::{Context, Result};
use std::time::Duration;

/// HTTP client for the discovery directory
#[derive(Debug, Clone)]
pub struct DiscoveryClient {
    http: reqwest::Client,
    prefix: String,
}

impl DiscoveryClient {
    /// Create a client whose requests give up after `timeout`.
    ///
    /// `prefix` is the registry key prefix, e.g. `mysql` for
    /// `/v2/keys/mysql/<cluster>/nodes`.
    pub fn new(timeout: Duration, prefix: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create discovery HTTP client")?;

        Ok(Self {
            http,
            prefix: prefix.trim_matches('/').to_string(),
        })
    }
}
