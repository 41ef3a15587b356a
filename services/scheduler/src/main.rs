//! cronmesh scheduler
//!
//! Runs the scheduling tick against the in-memory queues with a single local
//! agent. Launches are logged rather than sent to a resource manager.

use std::sync::Arc;

use anyhow::Result;
use cronmesh_scheduler::{
    config, local, logging, LoggingSink, SchedulerWorker, SlotStrategy, TaskQueues,
};
use tokio::sync::watch;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::Config::from_env()?;
    logging::init(&config.log_level)?;

    info!("Starting cronmesh scheduler");
    info!(
        tick_interval_secs = config.tick_interval.as_secs(),
        parallel_allocation = config.parallel_allocation,
        agent_id = %config.agent_id,
        agent_slots = config.agent_slots,
        "Configuration loaded"
    );

    let queues = Arc::new(TaskQueues::new());
    if let Some(path) = &config.jobs_file {
        for job in local::load_jobs(path)? {
            let job_name = job.job_name.clone();
            if let Err(e) = queues.register_job(job).await {
                warn!(job_name = %job_name, error = %e, "Skipping job");
                continue;
            }
            queues.mark_ready(&job_name).await;
        }
        info!(path = %path.display(), "Job definitions loaded");
    }

    // Create shutdown channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let worker = SchedulerWorker::new(
        SlotStrategy::new(config.agent_id.clone(), config.agent_slots),
        queues,
        Arc::new(LoggingSink::new()),
        config.worker_config(),
    );
    let mut worker_handle = tokio::spawn(async move {
        worker.run(shutdown_rx).await;
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
        result = &mut worker_handle => {
            if let Err(e) = result {
                error!(error = %e, "Scheduler worker panicked");
            }
            return Ok(());
        }
    }

    let _ = shutdown_tx.send(true);
    if let Err(e) = worker_handle.await {
        error!(error = %e, "Scheduler worker panicked");
    }

    info!("Scheduler shutdown complete");
    Ok(())
}
