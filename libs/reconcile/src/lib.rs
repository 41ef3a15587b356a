//! Eligible-job aggregation and resource assignment.
//!
//! Each scheduling tick produces three disjoint groups of work:
//!
//! - **Failover**: shards whose previous instance failed and must be relaunched.
//! - **Misfired**: jobs whose trigger fired while the scheduler could not dispatch.
//! - **Ready**: jobs due on their normal schedule, keyed by job name.
//!
//! [`EligibleJobs`] hands each group to an [`AllocateStrategy`] and folds the
//! three results into one [`AssignedTasks`]. Resource matching is entirely the
//! strategy's business; this crate only shapes and merges.
//!
//! # Invariants
//!
//! - Launch order is failover, then misfired, then ready in job-name order
//! - The aggregator never mutates its inputs and keeps no state between ticks
//! - A malformed task id from the strategy fails the whole allocation

mod assigned;
mod context;
mod eligible;
mod error;
mod launch;
mod strategy;

pub use assigned::AssignedTasks;
pub use context::{JobConfig, JobContext};
pub use eligible::EligibleJobs;
pub use error::AllocateError;
pub use launch::{CommandInfo, LaunchDescriptor, Resources};
pub use strategy::AllocateStrategy;
