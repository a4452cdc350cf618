//! Cron-driven batch scheduling.
//!
//! Registers one job that runs the same batch as `chanpulse run`. The
//! scheduler handle must stay alive for the lifetime of the process;
//! dropping it shuts down all scheduled jobs.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler};

use chanpulse_core::AppConfig;

/// Start the scheduler and block until ctrl-c.
///
/// # Errors
///
/// Returns an error if the cron expression is invalid or the scheduler
/// cannot start. Batch failures inside a tick are logged, never propagated —
/// the schedule keeps running.
pub(crate) async fn run_scheduled(config: AppConfig, cron: &str) -> anyhow::Result<()> {
    let config = Arc::new(config);
    let scheduler = JobScheduler::new().await?;

    let job_config = Arc::clone(&config);
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let config = Arc::clone(&job_config);
        Box::pin(async move {
            tracing::info!("scheduler: starting batch run");
            match crate::batch::run_once(&config, false).await {
                Ok(()) => tracing::info!("scheduler: batch run complete"),
                Err(e) => tracing::error!(error = %e, "scheduler: batch run failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    tracing::info!(cron = %cron, "scheduler: registered batch job");

    tokio::signal::ctrl_c().await?;
    tracing::info!("scheduler: shutting down");
    Ok(())
}
