//! Launch descriptors relayed to the resource manager.

use cronmesh_id::{IdError, TaskIdentity};
use serde::{Deserialize, Serialize};

/// Resources reserved for one task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    pub cpus: f64,
    pub mem_mb: f64,
}

/// How the agent starts the task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandInfo {
    /// Bundle fetched into the sandbox before the command runs.
    pub app_url: String,

    /// Shell command line.
    pub value: String,
}

/// One task ready to be launched against an offer.
///
/// Produced by an [`AllocateStrategy`](crate::AllocateStrategy). Everything
/// besides `task_id` belongs to the resource-manager protocol and is relayed
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchDescriptor {
    /// Composite task identifier.
    pub task_id: String,

    /// Human-readable task name shown by the resource manager.
    pub name: String,

    /// Agent the task is bound to.
    pub slave_id: String,

    pub resources: Resources,

    pub command: CommandInfo,
}

impl LaunchDescriptor {
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Parse the composite identifier carried by this descriptor.
    pub fn task_identity(&self) -> Result<TaskIdentity, IdError> {
        TaskIdentity::parse(&self.task_id)
    }
}
