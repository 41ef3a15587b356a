//! Job contexts handed to the allocation strategy.

use cronmesh_id::ExecutionType;
use serde::{Deserialize, Serialize};

/// Stored definition of a cloud job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Unique job name.
    pub job_name: String,

    /// Cron expression driving the ready schedule.
    pub cron: String,

    /// Number of shards one run of the job is split into.
    pub sharding_total_count: u32,

    /// CPUs requested per shard.
    pub cpu_count: f64,

    /// Memory requested per shard, in megabytes.
    pub memory_mb: f64,

    /// Where the agent fetches the job's application bundle from.
    pub app_url: String,

    /// Script run inside the bundle to start one shard.
    pub bootstrap_script: String,
}

/// One job eligible to run this tick, with the shards to launch.
#[derive(Debug, Clone, PartialEq)]
pub struct JobContext {
    job_config: JobConfig,
    assigned_sharding_items: Vec<u32>,
    execution_type: ExecutionType,
}

impl JobContext {
    /// Create a context for an explicit set of shards.
    pub fn new(
        job_config: JobConfig,
        assigned_sharding_items: Vec<u32>,
        execution_type: ExecutionType,
    ) -> Self {
        Self {
            job_config,
            assigned_sharding_items,
            execution_type,
        }
    }

    /// Create a context covering every shard of the job.
    pub fn from_config(job_config: JobConfig, execution_type: ExecutionType) -> Self {
        let items = (0..job_config.sharding_total_count).collect();
        Self::new(job_config, items, execution_type)
    }

    pub fn job_name(&self) -> &str {
        &self.job_config.job_name
    }

    pub fn job_config(&self) -> &JobConfig {
        &self.job_config
    }

    pub fn assigned_sharding_items(&self) -> &[u32] {
        &self.assigned_sharding_items
    }

    pub fn execution_type(&self) -> ExecutionType {
        self.execution_type
    }
}
