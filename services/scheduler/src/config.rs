//! Configuration for the scheduler.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::worker::WorkerConfig;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Time between scheduling ticks.
    pub tick_interval: Duration,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Run the three strategy calls of a tick concurrently.
    pub parallel_allocation: bool,

    /// Agent id stamped on locally placed tasks.
    pub agent_id: String,

    /// Task slots the local agent offers per allocation call.
    pub agent_slots: usize,

    /// JSON file of job definitions queued as ready at startup.
    pub jobs_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let tick_interval_secs: u64 = match var("CRONMESH_TICK_INTERVAL_SECS") {
            Some(s) => s
                .parse()
                .with_context(|| format!("invalid CRONMESH_TICK_INTERVAL_SECS: {s}"))?,
            None => 5,
        };
        if tick_interval_secs == 0 {
            bail!("CRONMESH_TICK_INTERVAL_SECS must be greater than zero");
        }

        let log_level = var("CRONMESH_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let parallel_allocation = var("CRONMESH_PARALLEL_ALLOCATION")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        let agent_id = var("CRONMESH_AGENT_ID").unwrap_or_else(|| "local-agent".to_string());
        if agent_id.is_empty() || agent_id.contains('@') {
            bail!("CRONMESH_AGENT_ID must be non-empty and must not contain '@'");
        }

        let agent_slots: usize = match var("CRONMESH_AGENT_SLOTS") {
            Some(s) => s
                .parse()
                .with_context(|| format!("invalid CRONMESH_AGENT_SLOTS: {s}"))?,
            None => 4,
        };
        if agent_slots == 0 {
            bail!("CRONMESH_AGENT_SLOTS must be greater than zero");
        }

        let jobs_file = var("CRONMESH_JOBS_FILE").map(PathBuf::from);

        Ok(Self {
            tick_interval: Duration::from_secs(tick_interval_secs),
            log_level,
            parallel_allocation,
            agent_id,
            agent_slots,
            jobs_file,
        })
    }

    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            tick_interval: self.tick_interval,
            parallel_allocation: self.parallel_allocation,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rstest::rstest;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.tick_interval, Duration::from_secs(5));
        assert_eq!(config.log_level, "info");
        assert!(!config.parallel_allocation);
        assert_eq!(config.agent_id, "local-agent");
        assert_eq!(config.agent_slots, 4);
        assert!(config.jobs_file.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("CRONMESH_TICK_INTERVAL_SECS", "30"),
            ("CRONMESH_LOG_LEVEL", "debug"),
            ("CRONMESH_PARALLEL_ALLOCATION", "TRUE"),
            ("CRONMESH_AGENT_ID", "agent-07"),
            ("CRONMESH_AGENT_SLOTS", "16"),
            ("CRONMESH_JOBS_FILE", "/etc/cronmesh/jobs.json"),
        ])
        .unwrap();

        assert_eq!(config.agent_id, "agent-07");
        assert_eq!(config.agent_slots, 16);
        assert_eq!(
            config.jobs_file.as_deref(),
            Some(std::path::Path::new("/etc/cronmesh/jobs.json"))
        );

        let worker = config.worker_config();
        assert_eq!(worker.tick_interval, Duration::from_secs(30));
        assert!(worker.parallel_allocation);
        assert_eq!(config.log_level, "debug");
    }

    #[rstest]
    #[case("0")]
    #[case("-1")]
    #[case("five")]
    fn test_rejects_bad_interval(#[case] value: &str) {
        assert!(load(&[("CRONMESH_TICK_INTERVAL_SECS", value)]).is_err());
    }

    #[rstest]
    #[case("CRONMESH_AGENT_SLOTS", "0")]
    #[case("CRONMESH_AGENT_SLOTS", "many")]
    #[case("CRONMESH_AGENT_ID", "")]
    #[case("CRONMESH_AGENT_ID", "agent@-")]
    fn test_rejects_bad_agent(#[case] key: &str, #[case] value: &str) {
        assert!(load(&[(key, value)]).is_err());
    }
}
