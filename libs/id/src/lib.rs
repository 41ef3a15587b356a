//! # cronmesh-id
//!
//! Task identifiers for the cronmesh scheduler.
//!
//! ## Identifier Format
//!
//! Every task launched on the resource manager carries a composite identifier:
//! `{job_name}@-@{sharding_item}@-@{execution_type}@-@{slave_id}@-@{uuid}`
//!
//! Examples:
//! - `billing-report@-@0@-@READY@-@agent-01@-@5c5f3e0e-7d8a-4b51-9a4e-2f0b1c3d4e5f`
//! - `log-rotate@-@3@-@FAILOVER@-@agent-07@-@0b7e0a52-1c8e-4f6a-8d2a-6e9b3c1f7a20`
//!
//! Job names and slave ids may not contain `@`.
//!
//! The identifier is the only thing that travels back from the resource manager
//! on status callbacks, so it has to carry enough to find the job and shard:
//! - the job name and shard (`meta_info`) locate the queued work
//! - the execution type says which queue the task was drawn from
//! - the uuid keeps two launches of the same shard apart

mod error;
mod execution;
mod task;

pub use error::IdError;
pub use execution::ExecutionType;
pub use task::{validate_job_name, TaskIdentity, DELIMITER};

/// Re-export uuid for consumers that build identities from known parts.
pub use uuid::Uuid;
