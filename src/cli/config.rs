use crate::cli::SettingsArgs;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Largest capture buffer accepted; each request allocates one
pub const MAX_BUFFER_SIZE: usize = 1024 * 1024 * 1024;

/// Process-wide relay settings, established once at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Root directory for backups; also served as static content
    #[serde(default = "default_backup_root")]
    pub backup_root: PathBuf,

    /// Comma-separated discovery endpoints, tried in order
    #[serde(default = "default_discovery_service")]
    pub discovery_service: String,

    /// Key prefix of the cluster registry (`/v2/keys/<prefix>/<cluster>/nodes`)
    #[serde(default = "default_discovery_prefix")]
    pub discovery_prefix: String,

    /// Timeout for each discovery request, in seconds
    #[serde(default = "default_discovery_timeout")]
    pub discovery_timeout_secs: u64,

    /// Host the HTTP server binds to
    #[serde(default = "default_listen_host")]
    pub listen_host: String,

    /// Port the HTTP server binds to
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Port members expose their backup stream on
    #[serde(default = "default_capture_port")]
    pub capture_port: u16,

    /// Size of the capture read buffer, in bytes
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Idle read timeout for the capture stream, in seconds; 0 disables it
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            backup_root: default_backup_root(),
            discovery_service: default_discovery_service(),
            discovery_prefix: default_discovery_prefix(),
            discovery_timeout_secs: default_discovery_timeout(),
            listen_host: default_listen_host(),
            listen_port: default_listen_port(),
            capture_port: default_capture_port(),
            buffer_size: default_buffer_size(),
            read_timeout_secs: default_read_timeout(),
        }
    }
}

fn default_backup_root() -> PathBuf {
    PathBuf::from("./backups")
}

fn default_discovery_service() -> String {
    "127.0.0.1:2379".to_string()
}

fn default_discovery_prefix() -> String {
    "mysql".to_string()
}

fn default_discovery_timeout() -> u64 {
    5
}

fn default_listen_host() -> String {
    "0.0.0.0".to_string()
}

fn default_listen_port() -> u16 {
    8080
}

fn default_capture_port() -> u16 {
    3307
}

fn default_buffer_size() -> usize {
    64 * 1024 * 1024
}

fn default_read_timeout() -> u64 {
    60
}

impl RelayConfig {
    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .context(format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: RelayConfig =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .context(format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Build the effective configuration: flags and environment variables
    /// override the config file, which overrides the defaults.
    pub fn from_settings(settings: &SettingsArgs) -> Result<Self> {
        let mut config = match &settings.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Some(root) = &settings.backup_root {
            config.backup_root = root.clone();
        }
        if let Some(discovery) = non_empty(&settings.discovery_service) {
            config.discovery_service = discovery;
        }
        if let Some(prefix) = non_empty(&settings.discovery_prefix) {
            config.discovery_prefix = prefix;
        }
        if let Some(timeout) = settings.discovery_timeout {
            config.discovery_timeout_secs = timeout;
        }
        if let Some(host) = non_empty(&settings.listen_host) {
            config.listen_host = host;
        }
        if let Some(port) = settings.listen_port {
            config.listen_port = port;
        }
        if let Some(port) = settings.capture_port {
            config.capture_port = port;
        }
        if let Some(size) = settings.buffer_size {
            config.buffer_size = size;
        }
        if let Some(timeout) = settings.read_timeout {
            config.read_timeout_secs = timeout;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the relay cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.discovery_candidates().is_empty() {
            bail!("No discovery service endpoints configured");
        }
        if self.buffer_size == 0 {
            bail!("Buffer size must be greater than zero");
        }
        if self.buffer_size > MAX_BUFFER_SIZE {
            bail!(
                "Buffer size {} exceeds the limit of {} bytes",
                self.buffer_size,
                MAX_BUFFER_SIZE
            );
        }
        if self.capture_port == 0 {
            bail!("Capture port must be set");
        }
        if self.discovery_prefix.trim_matches('/').is_empty() {
            bail!("Discovery prefix must not be empty");
        }
        Ok(())
    }

    /// Discovery endpoints in the order they are tried
    pub fn discovery_candidates(&self) -> Vec<String> {
        self.discovery_service
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Idle read timeout for capture connections, `None` when disabled
    pub fn read_timeout(&self) -> Option<Duration> {
        match self.read_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout_secs.max(1))
    }

    /// Address the HTTP server binds to
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.listen_host, self.listen_port)
    }

    /// Generate a sample configuration
    pub fn sample() -> Self {
        Self {
            backup_root: PathBuf::from("/var/backups/mysql"),
            discovery_service: "etcd-0.discovery:2379,etcd-1.discovery:2379".to_string(),
            ..Default::default()
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.capture_port, 3307);
        assert_eq!(config.listen_port, 8080);
        assert_eq!(config.buffer_size, 67108864);
        assert_eq!(config.read_timeout(), Some(Duration::from_secs(60)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_discovery_candidates_keep_order() {
        let config = RelayConfig {
            discovery_service: " a:2379, ,b:2379,c:2379 ".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.discovery_candidates(),
            vec!["a:2379", "b:2379", "c:2379"]
        );
    }

    #[test]
    fn test_zero_read_timeout_disables_it() {
        let config = RelayConfig {
            read_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.read_timeout(), None);
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let empty = RelayConfig {
            discovery_service: " , ".to_string(),
            ..Default::default()
        };
        assert!(empty.validate().is_err());

        let no_buffer = RelayConfig {
            buffer_size: 0,
            ..Default::default()
        };
        assert!(no_buffer.validate().is_err());

        let huge_buffer = RelayConfig {
            buffer_size: MAX_BUFFER_SIZE + 1,
            ..Default::default()
        };
        assert!(huge_buffer.validate().is_err());

        let max_buffer = RelayConfig {
            buffer_size: MAX_BUFFER_SIZE,
            ..Default::default()
        };
        assert!(max_buffer.validate().is_ok());
    }

    #[test]
    fn test_oversized_buffer_rejected_at_startup() {
        let settings = SettingsArgs {
            buffer_size: Some(usize::MAX),
            ..Default::default()
        };
        assert!(RelayConfig::from_settings(&settings).is_err());
    }

    #[test]
    fn test_settings_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.yaml");
        std::fs::write(&path, "capture_port: 4000\nlisten_port: 9000\n").unwrap();

        let settings = SettingsArgs {
            config: Some(path),
            listen_port: Some(9100),
            listen_host: Some(String::new()),
            ..Default::default()
        };
        let config = RelayConfig::from_settings(&settings).unwrap();

        assert_eq!(config.capture_port, 4000);
        assert_eq!(config.listen_port, 9100);
        assert_eq!(config.listen_host, "0.0.0.0");
        assert_eq!(config.discovery_prefix, "mysql");
    }

    #[test]
    fn test_sample_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.yaml");

        let config = RelayConfig::sample();
        config.save(&path).unwrap();

        let loaded = RelayConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
