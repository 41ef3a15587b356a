//! Eligible-job aggregation.

use std::collections::{BTreeMap, BTreeSet};
use std::thread;

use cronmesh_id::TaskIdentity;
use tracing::{debug, instrument};

use crate::{AllocateError, AllocateStrategy, AssignedTasks, JobContext, LaunchDescriptor};

/// The jobs eligible to run in one scheduling tick.
///
/// The three partitions are expected to be disjoint by job; the eligibility
/// scan that builds them is responsible for that.
#[derive(Debug, Clone, Default)]
pub struct EligibleJobs {
    failover: Vec<JobContext>,
    misfired: Vec<JobContext>,
    ready: BTreeMap<String, JobContext>,
}

impl EligibleJobs {
    pub fn new(
        failover: Vec<JobContext>,
        misfired: Vec<JobContext>,
        ready: BTreeMap<String, JobContext>,
    ) -> Self {
        Self {
            failover,
            misfired,
            ready,
        }
    }

    pub fn failover(&self) -> &[JobContext] {
        &self.failover
    }

    pub fn misfired(&self) -> &[JobContext] {
        &self.misfired
    }

    pub fn ready(&self) -> &BTreeMap<String, JobContext> {
        &self.ready
    }

    pub fn is_empty(&self) -> bool {
        self.failover.is_empty() && self.misfired.is_empty() && self.ready.is_empty()
    }

    /// Total number of job contexts across all partitions.
    pub fn job_count(&self) -> usize {
        self.failover.len() + self.misfired.len() + self.ready.len()
    }

    /// Allocate every partition with `strategy` and merge the results.
    ///
    /// The strategy is called for failover, misfired, then ready jobs. Launch
    /// order in the result follows the same precedence.
    #[instrument(skip_all, fields(
        failover = self.failover.len(),
        misfired = self.misfired.len(),
        ready = self.ready.len()
    ))]
    pub fn allocate<S>(&self, strategy: &S) -> Result<AssignedTasks, AllocateError<S::Error>>
    where
        S: AllocateStrategy + ?Sized,
    {
        let failover = strategy
            .allocate(&self.failover)
            .map_err(AllocateError::Strategy)?;
        let misfired = strategy
            .allocate(&self.misfired)
            .map_err(AllocateError::Strategy)?;
        let ready = strategy
            .allocate_by_job(&self.ready)
            .map_err(AllocateError::Strategy)?;

        assemble(failover, misfired, ready)
    }

    /// Same as [`allocate`](Self::allocate), with the three strategy calls
    /// running concurrently.
    ///
    /// If several calls fail, the error of the earliest partition wins.
    #[instrument(skip_all, fields(
        failover = self.failover.len(),
        misfired = self.misfired.len(),
        ready = self.ready.len()
    ))]
    pub fn allocate_parallel<S>(
        &self,
        strategy: &S,
    ) -> Result<AssignedTasks, AllocateError<S::Error>>
    where
        S: AllocateStrategy + Sync + ?Sized,
    {
        let (failover, misfired, ready) = thread::scope(|scope| {
            let failover = scope.spawn(|| strategy.allocate(&self.failover));
            let misfired = scope.spawn(|| strategy.allocate(&self.misfired));
            let ready = strategy.allocate_by_job(&self.ready);

            let failover = failover
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
            let misfired = misfired
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
            (failover, misfired, ready)
        });

        assemble(
            failover.map_err(AllocateError::Strategy)?,
            misfired.map_err(AllocateError::Strategy)?,
            ready.map_err(AllocateError::Strategy)?,
        )
    }
}

fn assemble<E>(
    failover: Vec<LaunchDescriptor>,
    misfired: Vec<LaunchDescriptor>,
    ready: BTreeMap<String, Vec<LaunchDescriptor>>,
) -> Result<AssignedTasks, AllocateError<E>>
where
    E: std::error::Error + 'static,
{
    let failover_tasks = failover
        .iter()
        .map(parse_identity::<E>)
        .collect::<Result<Vec<_>, _>>()?;
    let misfired_jobs = misfired
        .iter()
        .map(|d| parse_identity::<E>(d).map(|task| task.job_name().to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    let ready_jobs: BTreeSet<String> = ready.keys().cloned().collect();

    let ready_count: usize = ready.values().map(Vec::len).sum();
    let mut launches = Vec::with_capacity(failover.len() + misfired.len() + ready_count);
    launches.extend(failover);
    launches.extend(misfired);
    launches.extend(ready.into_values().flatten());

    debug!(
        launches = launches.len(),
        failover_tasks = failover_tasks.len(),
        misfired_tasks = misfired_jobs.len(),
        ready_jobs = ready_jobs.len(),
        "Merged allocation results"
    );

    Ok(AssignedTasks::new(
        launches,
        failover_tasks,
        misfired_jobs,
        ready_jobs,
    ))
}

fn parse_identity<E>(descriptor: &LaunchDescriptor) -> Result<TaskIdentity, AllocateError<E>>
where
    E: std::error::Error + 'static,
{
    descriptor
        .task_identity()
        .map_err(|source| AllocateError::MalformedTaskId {
            task_id: descriptor.task_id.clone(),
            source,
        })
}
