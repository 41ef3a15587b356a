//! Seams between the tick driver and the rest of the scheduler.

use anyhow::Result;
use async_trait::async_trait;
use cronmesh_reconcile::{AssignedTasks, EligibleJobs};

/// Supplies eligible work and records what was launched.
#[async_trait]
pub trait EligibilitySource: Send + Sync {
    /// Scan for the jobs eligible to run this tick.
    async fn eligible_jobs(&self) -> Result<EligibleJobs>;

    /// Record the outcome of a tick whose launches were accepted.
    async fn acknowledge(&self, assigned: &AssignedTasks) -> Result<()>;
}

/// Hands launch descriptors to the resource manager.
#[async_trait]
pub trait LaunchSink: Send + Sync {
    async fn launch(&self, assigned: &AssignedTasks) -> Result<()>;
}
