use anyhow::{bail, Result};
use backup_relay::backup::BackupRunner;
use backup_relay::cli::{self, Args, Command, RelayConfig};
use backup_relay::web;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let _subscriber = FmtSubscriber::builder()
        .with_env_filter(args.log_filter())
        .with_target(false)
        .init();

    match args.command {
        Command::Serve(serve_args) => {
            serve(serve_args).await?;
        }
        Command::Backup(backup_args) => {
            run_backup(backup_args).await?;
        }
        Command::Init(init_args) => {
            generate_sample_config(init_args)?;
        }
    }

    Ok(())
}

async fn serve(args: cli::ServeArgs) -> Result<()> {
    let config = RelayConfig::from_settings(&args.settings)?;

    info!("Backup root: {}", config.backup_root.display());
    info!("Discovery services: {}", config.discovery_service);
    info!(
        "Capture port: {}, buffer size: {} bytes, read timeout: {:?}",
        config.capture_port,
        config.buffer_size,
        config.read_timeout()
    );

    web::start_server(Arc::new(config)).await
}

async fn run_backup(args: cli::BackupArgs) -> Result<()> {
    let config = RelayConfig::from_settings(&args.settings)?;
    let runner = BackupRunner::new(Arc::new(config))?;

    let outcome = runner.run(&args.cluster).await;
    if !outcome.is_completed() {
        bail!("{}", outcome);
    }

    println!("{}", outcome);
    Ok(())
}

fn generate_sample_config(args: cli::InitArgs) -> Result<()> {
    let config = RelayConfig::sample();

    config.save(&args.output)?;
    println!("Generated sample config at: {:?}", args.output);

    Ok(())
}
