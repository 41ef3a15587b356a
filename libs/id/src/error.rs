//! Error types for task identifier parsing and validation.

use thiserror::Error;

/// Errors that can occur when building or parsing a task identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The identifier string is empty.
    #[error("task id cannot be empty")]
    Empty,

    /// The identifier does not split into the expected number of segments.
    #[error("task id has {actual} segments, expected {expected}")]
    SegmentCount { expected: usize, actual: usize },

    /// A required segment is empty.
    #[error("task id segment '{segment}' is empty")]
    EmptySegment { segment: &'static str },

    /// A segment contains `@`, which is reserved for the delimiter.
    #[error("task id segment '{segment}' contains reserved character '@'")]
    ReservedCharacter { segment: &'static str },

    /// The sharding item is not an unsigned integer.
    #[error("invalid sharding item: {0}")]
    InvalidShardingItem(String),

    /// The execution type is not one of the known tokens.
    #[error("invalid execution type: {0}")]
    InvalidExecutionType(String),

    /// The uuid segment is not a valid UUID.
    #[error("invalid uuid: {0}")]
    InvalidUuid(String),
}

impl IdError {
    /// Returns true if this error indicates the input was empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, IdError::Empty)
    }

    /// Returns true if the identifier had the wrong shape rather than a bad value.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            IdError::Empty | IdError::SegmentCount { .. } | IdError::EmptySegment { .. }
        )
    }
}
