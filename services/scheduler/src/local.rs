//! Single-agent strategy and sink for running the scheduler locally.
//!
//! Nothing here talks to a resource manager: [`SlotStrategy`] pretends one
//! agent offers a fixed number of task slots per call, and [`LoggingSink`]
//! logs each launch instead of accepting an offer.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use async_trait::async_trait;
use cronmesh_id::{IdError, TaskIdentity};
use cronmesh_reconcile::{
    AllocateStrategy, AssignedTasks, CommandInfo, JobConfig, JobContext, LaunchDescriptor,
    Resources,
};
use tracing::info;

use crate::source::LaunchSink;

/// Places shards on one agent until its slots run out.
///
/// Failover and misfired jobs may be placed partially. A ready job is placed
/// only when all of its shards fit.
#[derive(Debug, Clone)]
pub struct SlotStrategy {
    slave_id: String,
    slots: usize,
}

impl SlotStrategy {
    pub fn new(slave_id: impl Into<String>, slots: usize) -> Self {
        Self {
            slave_id: slave_id.into(),
            slots,
        }
    }

    fn place(&self, job: &JobContext, item: u32) -> Result<LaunchDescriptor, IdError> {
        let task = TaskIdentity::new(job.job_name(), item, job.execution_type(), &self.slave_id)?;
        let config = job.job_config();
        Ok(LaunchDescriptor {
            task_id: task.id(),
            name: task.meta_info(),
            slave_id: self.slave_id.clone(),
            resources: Resources {
                cpus: config.cpu_count,
                mem_mb: config.memory_mb,
            },
            command: CommandInfo {
                app_url: config.app_url.clone(),
                value: config.bootstrap_script.clone(),
            },
        })
    }
}

impl AllocateStrategy for SlotStrategy {
    type Error = IdError;

    fn allocate(&self, jobs: &[JobContext]) -> Result<Vec<LaunchDescriptor>, IdError> {
        jobs.iter()
            .flat_map(|job| job.assigned_sharding_items().iter().map(move |&i| (job, i)))
            .take(self.slots)
            .map(|(job, item)| self.place(job, item))
            .collect()
    }

    fn allocate_by_job(
        &self,
        jobs: &BTreeMap<String, JobContext>,
    ) -> Result<BTreeMap<String, Vec<LaunchDescriptor>>, IdError> {
        let mut free = self.slots;
        let mut placed = BTreeMap::new();
        for (name, job) in jobs {
            let items = job.assigned_sharding_items();
            if items.len() > free {
                continue;
            }
            free -= items.len();
            let launches = items
                .iter()
                .map(|&item| self.place(job, item))
                .collect::<Result<Vec<_>, _>>()?;
            placed.insert(name.clone(), launches);
        }
        Ok(placed)
    }
}

/// Logs launches instead of handing them to a resource manager.
#[derive(Debug, Default)]
pub struct LoggingSink {
    launched: AtomicUsize,
}

impl LoggingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of tasks logged so far.
    pub fn launched(&self) -> usize {
        self.launched.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LaunchSink for LoggingSink {
    async fn launch(&self, assigned: &AssignedTasks) -> Result<()> {
        for launch in assigned.launches() {
            info!(
                task_id = %launch.task_id,
                slave_id = %launch.slave_id,
                cpus = launch.resources.cpus,
                mem_mb = launch.resources.mem_mb,
                command = %launch.command.value,
                "[LOCAL] Launching task"
            );
        }
        self.launched
            .fetch_add(assigned.launches().len(), Ordering::SeqCst);
        Ok(())
    }
}

/// Parse a JSON array of job definitions.
pub fn parse_jobs(json: &str) -> Result<Vec<JobConfig>> {
    serde_json::from_str(json).context("invalid job definitions")
}

/// Read job definitions from a JSON file.
pub fn load_jobs(path: &Path) -> Result<Vec<JobConfig>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_jobs(&json)
}

#[cfg(test)]
mod tests {
    use cronmesh_id::ExecutionType;
    use cronmesh_reconcile::EligibleJobs;

    use super::*;

    fn config(name: &str, shards: u32) -> JobConfig {
        JobConfig {
            job_name: name.to_string(),
            cron: "0 0/5 * * * ?".to_string(),
            sharding_total_count: shards,
            cpu_count: 0.5,
            memory_mb: 128.0,
            app_url: "http://repo/app.tar.gz".to_string(),
            bootstrap_script: "bin/run.sh".to_string(),
        }
    }

    #[test]
    fn test_partial_placement_stops_at_slot_limit() {
        let strategy = SlotStrategy::new("local-agent", 3);
        let jobs = vec![
            JobContext::from_config(config("a", 2), ExecutionType::Misfired),
            JobContext::from_config(config("b", 2), ExecutionType::Misfired),
        ];

        let launches = strategy.allocate(&jobs).unwrap();

        let names: Vec<_> = launches.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a@-@0", "a@-@1", "b@-@0"]);
        let task = launches[2].task_identity().unwrap();
        assert_eq!(task.execution_type(), ExecutionType::Misfired);
        assert_eq!(task.slave_id(), "local-agent");
        assert_eq!(launches[2].resources.mem_mb, 128.0);
    }

    #[test]
    fn test_ready_job_is_placed_whole_or_not_at_all() {
        let strategy = SlotStrategy::new("local-agent", 2);
        let mut ready = BTreeMap::new();
        ready.insert(
            "big".to_string(),
            JobContext::from_config(config("big", 3), ExecutionType::Ready),
        );
        ready.insert(
            "small".to_string(),
            JobContext::from_config(config("small", 2), ExecutionType::Ready),
        );

        let placed = strategy.allocate_by_job(&ready).unwrap();

        assert_eq!(placed.keys().collect::<Vec<_>>(), vec!["small"]);
        assert_eq!(placed["small"].len(), 2);
    }

    #[test]
    fn test_reserved_agent_id_fails_allocation() {
        let strategy = SlotStrategy::new("agent@-", 1);
        let jobs = vec![JobContext::from_config(config("a", 1), ExecutionType::Failover)];

        assert_eq!(
            strategy.allocate(&jobs).unwrap_err(),
            IdError::ReservedCharacter { segment: "slave_id" }
        );
    }

    #[tokio::test]
    async fn test_logging_sink_counts_launches() {
        let strategy = SlotStrategy::new("local-agent", 4);
        let mut ready = BTreeMap::new();
        ready.insert(
            "job".to_string(),
            JobContext::from_config(config("job", 2), ExecutionType::Ready),
        );
        let assigned = EligibleJobs::new(vec![], vec![], ready)
            .allocate(&strategy)
            .unwrap();

        let sink = LoggingSink::new();
        sink.launch(&assigned).await.unwrap();

        assert_eq!(sink.launched(), 2);
    }

    #[test]
    fn test_parse_jobs() {
        let jobs = parse_jobs(
            r#"[{
                "job_name": "nightly",
                "cron": "0 0 2 * * ?",
                "sharding_total_count": 2,
                "cpu_count": 1.0,
                "memory_mb": 256.0,
                "app_url": "http://repo/nightly.tar.gz",
                "bootstrap_script": "bin/nightly.sh"
            }]"#,
        )
        .unwrap();

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].job_name, "nightly");
        assert_eq!(jobs[0].sharding_total_count, 2);
    }

    #[test]
    fn test_parse_jobs_rejects_bad_json() {
        assert!(parse_jobs("{\"job_name\": \"nightly\"}").is_err());
    }

    #[test]
    fn test_load_jobs_reports_missing_file() {
        let err = load_jobs(Path::new("/nonexistent/cronmesh/jobs.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
