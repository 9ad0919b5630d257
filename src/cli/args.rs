use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// BACKUP-RELAY: on-demand xbstream capture for database clusters
///
/// Looks up the online member of a cluster in the discovery service, pulls
/// its backup stream over TCP and stores it under the backup root.
#[derive(Parser, Debug)]
#[command(name = "backup-relay")]
#[command(version = "0.1.0")]
#[command(about = "Trigger and store xbstream backups of database clusters")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Args {
    /// Log filter: `RUST_LOG` when set, otherwise INFO (DEBUG with `--verbose`)
    pub fn log_filter(&self) -> EnvFilter {
        log_filter(self.verbose, std::env::var("RUST_LOG").ok().as_deref())
    }
}

fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let default = if verbose { "debug" } else { "info" };
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default))
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the backup trigger and the backup directory over HTTP
    Serve(ServeArgs),

    /// Run a single backup and print the outcome
    Backup(BackupArgs),

    /// Generate a sample configuration file
    Init(InitArgs),
}

/// Settings shared by every command that talks to a cluster.
///
/// Each value falls back to its environment variable, then to the
/// configuration file, then to the built-in default.
#[derive(ClapArgs, Debug, Default, Clone)]
pub struct SettingsArgs {
    /// Path to a YAML configuration file
    #[arg(short, long, env = "BACKUP_RELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding one sub-directory of backups per cluster
    #[arg(long, env = "HTTP_DIR")]
    pub backup_root: Option<PathBuf>,

    /// Comma-separated discovery service endpoints (host:port)
    #[arg(long, env = "DISCOVERY_SERVICE")]
    pub discovery_service: Option<String>,

    /// Key prefix under which clusters are registered in discovery
    #[arg(long, env = "DISCOVERY_PREFIX")]
    pub discovery_prefix: Option<String>,

    /// Timeout in seconds for each discovery request
    #[arg(long, env = "DISCOVERY_TIMEOUT")]
    pub discovery_timeout: Option<u64>,

    /// Host the HTTP server binds to
    #[arg(long, env = "BACKUP_SERVER")]
    pub listen_host: Option<String>,

    /// Port the HTTP server binds to
    #[arg(long, env = "BACKUP_PORT")]
    pub listen_port: Option<u16>,

    /// Port on which cluster members stream their backup
    #[arg(long, env = "NCAT_PORT")]
    pub capture_port: Option<u16>,

    /// Read buffer size in bytes
    #[arg(long, env = "RW_BUFFER_SIZE")]
    pub buffer_size: Option<usize>,

    /// Idle read timeout in seconds (0 disables it)
    #[arg(long, env = "READ_TIMEOUT")]
    pub read_timeout: Option<u64>,
}

#[derive(Parser, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,
}

#[derive(Parser, Debug)]
pub struct BackupArgs {
    /// Cluster to back up
    #[arg(long)]
    pub cluster: String,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Output path for the config file
    #[arg(short, long, default_value = "backup-relay.yaml")]
    pub output: PathBuf,
}
