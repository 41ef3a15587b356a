//! In-memory pending-task queues.
//!
//! Holds registered job configs plus the failover, misfired and ready queues,
//! and tracks which shards are running so a job is never launched twice.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use async_trait::async_trait;
use cronmesh_id::{validate_job_name, ExecutionType, IdError, TaskIdentity};
use cronmesh_reconcile::{AssignedTasks, EligibleJobs, JobConfig, JobContext};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::source::EligibilitySource;

#[derive(Debug, Default)]
struct QueueState {
    jobs: BTreeMap<String, JobConfig>,
    failover: BTreeMap<String, BTreeSet<u32>>,
    misfired: BTreeSet<String>,
    ready: BTreeSet<String>,
    running: BTreeMap<String, BTreeSet<u32>>,
}

impl QueueState {
    fn is_running(&self, job_name: &str) -> bool {
        self.running.get(job_name).is_some_and(|s| !s.is_empty())
    }

    fn is_shard_running(&self, job_name: &str, item: u32) -> bool {
        self.running
            .get(job_name)
            .is_some_and(|s| s.contains(&item))
    }

    fn clear_running(&mut self, task: &TaskIdentity) {
        if let Some(shards) = self.running.get_mut(task.job_name()) {
            shards.remove(&task.sharding_item());
            if shards.is_empty() {
                self.running.remove(task.job_name());
            }
        }
    }
}

/// In-memory [`EligibilitySource`].
#[derive(Debug, Default)]
pub struct TaskQueues {
    state: RwLock<QueueState>,
}

impl TaskQueues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a job definition.
    ///
    /// Names that cannot be embedded in a task id are refused.
    pub async fn register_job(&self, config: JobConfig) -> Result<(), IdError> {
        validate_job_name(&config.job_name)?;
        let mut state = self.state.write().await;
        debug!(job_name = %config.job_name, "Job registered");
        state.jobs.insert(config.job_name.clone(), config);
        Ok(())
    }

    /// Remove a job and everything queued for it. Running shards are forgotten.
    pub async fn deregister_job(&self, job_name: &str) -> bool {
        let mut state = self.state.write().await;
        state.failover.remove(job_name);
        state.misfired.remove(job_name);
        state.ready.remove(job_name);
        state.running.remove(job_name);
        state.jobs.remove(job_name).is_some()
    }

    /// Queue a job for its normal run. Returns false for unknown jobs.
    pub async fn mark_ready(&self, job_name: &str) -> bool {
        let mut state = self.state.write().await;
        if !state.jobs.contains_key(job_name) {
            return false;
        }
        state.ready.insert(job_name.to_string());
        true
    }

    /// Queue a catch-up run for a job whose trigger was missed.
    pub async fn mark_misfired(&self, job_name: &str) -> bool {
        let mut state = self.state.write().await;
        if !state.jobs.contains_key(job_name) {
            return false;
        }
        state.misfired.insert(job_name.to_string());
        true
    }

    /// Queue one shard for relaunch.
    ///
    /// Returns false if the job is unknown or the shard is out of range.
    pub async fn enqueue_failover(&self, job_name: &str, sharding_item: u32) -> bool {
        let mut state = self.state.write().await;
        let Some(config) = state.jobs.get(job_name) else {
            return false;
        };
        if sharding_item >= config.sharding_total_count {
            return false;
        }
        state
            .failover
            .entry(job_name.to_string())
            .or_default()
            .insert(sharding_item);
        true
    }

    /// A launched task finished normally.
    pub async fn complete_task(&self, task: &TaskIdentity) {
        let mut state = self.state.write().await;
        state.clear_running(task);
    }

    /// A launched task failed; its shard goes back on the failover queue.
    pub async fn fail_task(&self, task: &TaskIdentity) {
        let mut state = self.state.write().await;
        state.clear_running(task);
        if state.jobs.contains_key(task.job_name()) {
            state
                .failover
                .entry(task.job_name().to_string())
                .or_default()
                .insert(task.sharding_item());
            debug!(task = %task.meta_info(), "Shard queued for failover");
        }
    }

    pub async fn pending_failover(&self, job_name: &str) -> Vec<u32> {
        let state = self.state.read().await;
        state
            .failover
            .get(job_name)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    pub async fn is_misfired(&self, job_name: &str) -> bool {
        self.state.read().await.misfired.contains(job_name)
    }

    pub async fn is_ready(&self, job_name: &str) -> bool {
        self.state.read().await.ready.contains(job_name)
    }

    pub async fn running_shards(&self, job_name: &str) -> Vec<u32> {
        let state = self.state.read().await;
        state
            .running
            .get(job_name)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EligibilitySource for TaskQueues {
    async fn eligible_jobs(&self) -> Result<EligibleJobs> {
        let state = self.state.read().await;
        let mut taken = BTreeSet::new();

        let mut failover = Vec::new();
        for (job_name, shards) in &state.failover {
            let Some(config) = state.jobs.get(job_name) else {
                continue;
            };
            let items: Vec<u32> = shards
                .iter()
                .copied()
                .filter(|&item| !state.is_shard_running(job_name, item))
                .collect();
            if items.is_empty() {
                continue;
            }
            taken.insert(job_name.as_str());
            failover.push(JobContext::new(
                config.clone(),
                items,
                ExecutionType::Failover,
            ));
        }

        let mut misfired = Vec::new();
        for job_name in &state.misfired {
            if taken.contains(job_name.as_str()) || state.is_running(job_name) {
                continue;
            }
            let Some(config) = state.jobs.get(job_name) else {
                continue;
            };
            taken.insert(job_name.as_str());
            misfired.push(JobContext::from_config(
                config.clone(),
                ExecutionType::Misfired,
            ));
        }

        let mut ready = BTreeMap::new();
        for job_name in &state.ready {
            if taken.contains(job_name.as_str()) || state.is_running(job_name) {
                continue;
            }
            let Some(config) = state.jobs.get(job_name) else {
                continue;
            };
            ready.insert(
                job_name.clone(),
                JobContext::from_config(config.clone(), ExecutionType::Ready),
            );
        }

        Ok(EligibleJobs::new(failover, misfired, ready))
    }

    async fn acknowledge(&self, assigned: &AssignedTasks) -> Result<()> {
        let mut state = self.state.write().await;

        for task in assigned.failover_tasks() {
            if let Some(shards) = state.failover.get_mut(task.job_name()) {
                shards.remove(&task.sharding_item());
                if shards.is_empty() {
                    state.failover.remove(task.job_name());
                }
            }
        }
        for job_name in assigned.misfired_jobs() {
            state.misfired.remove(job_name);
        }
        for job_name in assigned.ready_jobs() {
            state.ready.remove(job_name);
        }

        for launch in assigned.launches() {
            match launch.task_identity() {
                Ok(task) => {
                    state
                        .running
                        .entry(task.job_name().to_string())
                        .or_default()
                        .insert(task.sharding_item());
                }
                Err(e) => {
                    warn!(
                        task_id = %launch.task_id(),
                        error = %e,
                        "Launched task has unparseable id"
                    );
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(name: &str, shards: u32) -> JobConfig {
        JobConfig {
            job_name: name.to_string(),
            cron: "0 0/1 * * * ?".to_string(),
            sharding_total_count: shards,
            cpu_count: 1.0,
            memory_mb: 256.0,
            app_url: "http://repo/app.tar.gz".to_string(),
            bootstrap_script: "bin/start.sh".to_string(),
        }
    }

    #[tokio::test]
    async fn test_unknown_jobs_are_rejected() {
        let queues = TaskQueues::new();
        assert!(!queues.mark_ready("ghost").await);
        assert!(!queues.mark_misfired("ghost").await);
        assert!(!queues.enqueue_failover("ghost", 0).await);
    }

    #[tokio::test]
    async fn test_register_rejects_names_with_reserved_character() {
        let queues = TaskQueues::new();
        for name in ["report@-", "-@report", "a@b", ""] {
            assert!(queues.register_job(config(name, 1)).await.is_err());
        }

        // Nothing was stored, so the job cannot be queued.
        assert!(!queues.mark_ready("report@-").await);
        assert!(queues.eligible_jobs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failover_shard_out_of_range() {
        let queues = TaskQueues::new();
        queues.register_job(config("job", 2)).await.unwrap();
        assert!(queues.enqueue_failover("job", 1).await);
        assert!(!queues.enqueue_failover("job", 2).await);
    }

    #[tokio::test]
    async fn test_partitions_are_disjoint() {
        let queues = TaskQueues::new();
        for name in ["a", "b", "c"] {
            queues.register_job(config(name, 2)).await.unwrap();
        }
        // "a" is queued everywhere, "b" is misfired and ready, "c" only ready.
        queues.enqueue_failover("a", 1).await;
        queues.mark_misfired("a").await;
        queues.mark_ready("a").await;
        queues.mark_misfired("b").await;
        queues.mark_ready("b").await;
        queues.mark_ready("c").await;

        let jobs = queues.eligible_jobs().await.unwrap();

        assert_eq!(jobs.failover().len(), 1);
        assert_eq!(jobs.failover()[0].job_name(), "a");
        assert_eq!(jobs.failover()[0].assigned_sharding_items(), &[1]);
        assert_eq!(jobs.misfired().len(), 1);
        assert_eq!(jobs.misfired()[0].job_name(), "b");
        assert_eq!(jobs.misfired()[0].assigned_sharding_items(), &[0, 1]);
        assert_eq!(jobs.ready().keys().collect::<Vec<_>>(), vec!["c"]);
    }

    #[tokio::test]
    async fn test_running_jobs_are_held_back() {
        let queues = TaskQueues::new();
        queues.register_job(config("job", 2)).await.unwrap();
        let running = TaskIdentity::new("job", 0, ExecutionType::Ready, "agent").unwrap();
        queues
            .acknowledge(&AssignedTasks::new(
                vec![cronmesh_reconcile::LaunchDescriptor {
                    task_id: running.id(),
                    name: "job-0".to_string(),
                    slave_id: "agent".to_string(),
                    resources: cronmesh_reconcile::Resources {
                        cpus: 1.0,
                        mem_mb: 256.0,
                    },
                    command: cronmesh_reconcile::CommandInfo {
                        app_url: "http://repo/app.tar.gz".to_string(),
                        value: "bin/start.sh".to_string(),
                    },
                }],
                vec![],
                vec![],
                BTreeSet::new(),
            ))
            .await
            .unwrap();
        queues.mark_ready("job").await;
        queues.enqueue_failover("job", 1).await;

        let jobs = queues.eligible_jobs().await.unwrap();
        assert!(jobs.ready().is_empty());
        // Shard 1 is idle, so it fails over while shard 0 keeps running.
        assert_eq!(jobs.failover()[0].assigned_sharding_items(), &[1]);

        queues.complete_task(&running).await;
        assert!(queues.running_shards("job").await.is_empty());
    }

    #[tokio::test]
    async fn test_fail_task_requeues_shard() {
        let queues = TaskQueues::new();
        queues.register_job(config("job", 3)).await.unwrap();
        let task = TaskIdentity::new("job", 2, ExecutionType::Ready, "agent").unwrap();

        queues.fail_task(&task).await;

        assert_eq!(queues.pending_failover("job").await, vec![2]);
    }

    #[tokio::test]
    async fn test_deregister_clears_queues() {
        let queues = TaskQueues::new();
        queues.register_job(config("job", 1)).await.unwrap();
        queues.mark_ready("job").await;
        queues.mark_misfired("job").await;

        assert!(queues.deregister_job("job").await);
        assert!(!queues.is_ready("job").await);
        assert!(!queues.is_misfired("job").await);
        assert!(queues.eligible_jobs().await.unwrap().is_empty());
    }
}
