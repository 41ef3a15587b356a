//! Scheduler background worker.
//!
//! Runs one allocation pass per tick: scan, allocate, launch, acknowledge.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use cronmesh_reconcile::AllocateStrategy;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument};

use crate::source::{EligibilitySource, LaunchSink};

/// Tick loop configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Interval between scheduling ticks.
    pub tick_interval: Duration,

    /// Run the three strategy calls of a tick concurrently.
    pub parallel_allocation: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(5),
            parallel_allocation: false,
        }
    }
}

/// What one tick launched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub launched: usize,
    pub failover: usize,
    pub misfired: usize,
    pub ready: usize,
}

/// Scheduler worker that runs the allocation loop.
pub struct SchedulerWorker<S> {
    strategy: S,
    source: Arc<dyn EligibilitySource>,
    sink: Arc<dyn LaunchSink>,
    config: WorkerConfig,
}

impl<S> SchedulerWorker<S>
where
    S: AllocateStrategy + Send + Sync,
{
    /// Create a new scheduler worker.
    pub fn new(
        strategy: S,
        source: Arc<dyn EligibilitySource>,
        sink: Arc<dyn LaunchSink>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            strategy,
            source,
            sink,
            config,
        }
    }

    /// Run the worker until shutdown is signaled.
    #[instrument(skip(self, shutdown))]
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            tick_interval_ms = self.config.tick_interval.as_millis() as u64,
            parallel_allocation = self.config.parallel_allocation,
            "Starting scheduler worker"
        );

        let mut interval = tokio::time::interval(self.config.tick_interval);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.run_tick().await {
                        error!(error = %e, "Scheduling tick failed");
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Scheduler worker shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// Run a single scheduling tick.
    ///
    /// Work is acknowledged only after the sink accepted the launches, so a
    /// failed launch leaves everything queued for the next tick.
    #[instrument(skip(self))]
    pub async fn run_tick(&self) -> Result<TickStats> {
        let eligible = self
            .source
            .eligible_jobs()
            .await
            .context("eligibility scan failed")?;
        if eligible.is_empty() {
            debug!("No eligible jobs");
            return Ok(TickStats::default());
        }

        let assigned = if self.config.parallel_allocation {
            eligible.allocate_parallel(&self.strategy)
        } else {
            eligible.allocate(&self.strategy)
        }
        .context("allocation failed")?;

        if assigned.is_empty() {
            debug!(eligible = eligible.job_count(), "Nothing fit this tick");
            return Ok(TickStats::default());
        }

        self.sink
            .launch(&assigned)
            .await
            .context("launch failed")?;
        self.source
            .acknowledge(&assigned)
            .await
            .context("acknowledge failed")?;

        let stats = TickStats {
            launched: assigned.launches().len(),
            failover: assigned.failover_tasks().len(),
            misfired: assigned.misfired_jobs().len(),
            ready: assigned.ready_jobs().len(),
        };
        info!(
            launched = stats.launched,
            failover = stats.failover,
            misfired = stats.misfired,
            ready = stats.ready,
            "Scheduling tick complete"
        );

        Ok(stats)
    }
}
