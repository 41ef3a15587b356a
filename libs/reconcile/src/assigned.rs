//! Assigned-task result of one scheduling tick.

use std::collections::BTreeSet;

use cronmesh_id::TaskIdentity;

use crate::LaunchDescriptor;

/// Everything the scheduler needs after one allocation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignedTasks {
    launches: Vec<LaunchDescriptor>,
    failover_tasks: Vec<TaskIdentity>,
    misfired_jobs: Vec<String>,
    ready_jobs: BTreeSet<String>,
}

impl AssignedTasks {
    pub fn new(
        launches: Vec<LaunchDescriptor>,
        failover_tasks: Vec<TaskIdentity>,
        misfired_jobs: Vec<String>,
        ready_jobs: BTreeSet<String>,
    ) -> Self {
        Self {
            launches,
            failover_tasks,
            misfired_jobs,
            ready_jobs,
        }
    }

    /// All descriptors in launch order: failover, misfired, ready.
    pub fn launches(&self) -> &[LaunchDescriptor] {
        &self.launches
    }

    /// Identities of the failover tasks that were placed, in launch order.
    pub fn failover_tasks(&self) -> &[TaskIdentity] {
        &self.failover_tasks
    }

    /// One job name per misfired task instance placed, duplicates kept.
    pub fn misfired_jobs(&self) -> &[String] {
        &self.misfired_jobs
    }

    /// Ready jobs the strategy allocated for.
    pub fn ready_jobs(&self) -> &BTreeSet<String> {
        &self.ready_jobs
    }

    /// Returns true if nothing is to be launched and no ready job was taken.
    pub fn is_empty(&self) -> bool {
        self.launches.is_empty() && self.ready_jobs.is_empty()
    }

    /// Consume the result, keeping only the descriptors.
    pub fn into_launches(self) -> Vec<LaunchDescriptor> {
        self.launches
    }
}
