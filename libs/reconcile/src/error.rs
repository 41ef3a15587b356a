//! Allocation errors.

use cronmesh_id::IdError;
use thiserror::Error;

/// Errors returned by [`EligibleJobs::allocate`](crate::EligibleJobs::allocate).
#[derive(Debug, Error)]
pub enum AllocateError<E: std::error::Error + 'static> {
    /// The strategy failed; its error is passed through as-is.
    #[error(transparent)]
    Strategy(E),

    /// The strategy returned a descriptor whose task id does not parse.
    #[error("strategy returned malformed task id '{task_id}'")]
    MalformedTaskId {
        task_id: String,
        #[source]
        source: IdError,
    },
}

impl<E: std::error::Error + 'static> AllocateError<E> {
    /// Returns the strategy error, if that is what failed.
    pub fn strategy_error(&self) -> Option<&E> {
        match self {
            Self::Strategy(e) => Some(e),
            Self::MalformedTaskId { .. } => None,
        }
    }
}
