mod batch;
mod schedule;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "chanpulse")]
#[command(about = "Tenant channel analysis and AI content suggestions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one batch over all eligible tenants now.
    Run {
        /// List the tenants that would be processed, without executing.
        #[arg(long)]
        dry_run: bool,
    },
    /// Keep running batches on a cron schedule until interrupted.
    Schedule {
        /// Six-field cron expression (seconds first).
        #[arg(long, env = "CHANPULSE_CRON", default_value = "0 0 6 * * *")]
        cron: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = chanpulse_core::load_app_config_from_env()?;

    match cli.command {
        Commands::Run { dry_run } => batch::run_once(&config, dry_run).await,
        Commands::Schedule { cron } => schedule::run_scheduled(config, &cron).await,
    }
}
