//! Allocation strategy seam.

use std::collections::BTreeMap;

use crate::{JobContext, LaunchDescriptor};

/// Matches pending jobs against available resources.
///
/// Implementations decide which of the given jobs fit and emit one
/// [`LaunchDescriptor`] per task they place. Returning descriptors for only a
/// subset of the input is normal and not an error. Every descriptor's
/// `task_id` must be a well-formed [`TaskIdentity`](cronmesh_id::TaskIdentity).
///
/// Launch order is fixed by the caller: failover, then misfired, then ready.
/// Within the first two categories descriptors keep the order the strategy
/// returned them in. Ready results come back as a [`BTreeMap`], so ready
/// launches always follow job-name order and a strategy cannot reorder them.
pub trait AllocateStrategy {
    /// Failure raised by the strategy, passed through unchanged.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Allocate a plain sequence of jobs.
    fn allocate(&self, jobs: &[JobContext]) -> Result<Vec<LaunchDescriptor>, Self::Error>;

    /// Allocate jobs keyed by name.
    ///
    /// The returned map holds only the jobs the strategy allocated for; it may
    /// be a subset of `jobs`. Descriptors within one job's entry keep their
    /// order, but entries are read back in key order.
    fn allocate_by_job(
        &self,
        jobs: &BTreeMap<String, JobContext>,
    ) -> Result<BTreeMap<String, Vec<LaunchDescriptor>>, Self::Error>;
}

impl<S: AllocateStrategy + ?Sized> AllocateStrategy for &S {
    type Error = S::Error;

    fn allocate(&self, jobs: &[JobContext]) -> Result<Vec<LaunchDescriptor>, Self::Error> {
        (**self).allocate(jobs)
    }

    fn allocate_by_job(
        &self,
        jobs: &BTreeMap<String, JobContext>,
    ) -> Result<BTreeMap<String, Vec<LaunchDescriptor>>, Self::Error> {
        (**self).allocate_by_job(jobs)
    }
}
