//! cronmesh scheduler
//!
//! Drives one allocation pass per scheduling tick:
//!
//! - **Eligibility scan**: an [`EligibilitySource`] reports failover, misfired
//!   and ready work
//! - **Allocation**: the eligible jobs are matched to resources by an
//!   [`AllocateStrategy`](cronmesh_reconcile::AllocateStrategy)
//! - **Launch**: the merged descriptors go to a [`LaunchSink`]
//! - **Acknowledge**: the source drops the work that was launched
//!
//! [`TaskQueues`] is the in-memory source used in development and tests;
//! [`local`] supplies a single-agent strategy and a logging sink so the
//! binary can run without a resource manager.

pub mod config;
pub mod local;
pub mod logging;
pub mod queues;
pub mod source;
pub mod worker;

pub use config::Config;
pub use local::{LoggingSink, SlotStrategy};
pub use queues::TaskQueues;
pub use source::{EligibilitySource, LaunchSink};
pub use worker::{SchedulerWorker, TickStats, WorkerConfig};
