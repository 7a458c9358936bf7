use std::path::PathBuf;

use alert_relay::{
    cmd::{DryRunArgs, dry_run},
    config::AppConfig,
    supervisor::Supervisor,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serves the webhook API and relays alerts to the configured rooms.
    Run {
        /// Path to the configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Renders an Alertmanager payload with a room's template without
    /// delivering it.
    DryRun(DryRunArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if cli.json_logs {
        let subscriber = FmtSubscriber::builder().with_env_filter(env_filter).json().finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder().with_env_filter(env_filter).finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    match cli.command {
        Commands::Run { config } => run_supervisor(config).await?,
        Commands::DryRun(args) => dry_run::execute(args).await?,
    }

    Ok(())
}

async fn run_supervisor(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    tracing::debug!("Loading application configuration...");
    let config = AppConfig::new(config_path.as_deref())?;
    tracing::debug!(
        listen_address = %config.server.listen_address,
        rooms = config.rooms.len(),
        "Configuration loaded."
    );

    let supervisor = Supervisor::builder().config(config).build().await?;

    tracing::info!("Supervisor initialized, starting HTTP server...");
    supervisor.run().await?;

    Ok(())
}
