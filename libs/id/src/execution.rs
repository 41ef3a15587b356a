//! Execution type of a launched task.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::IdError;

/// Which eligibility queue a task was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionType {
    /// Due on its normal schedule.
    Ready,

    /// Relaunch of a shard whose previous instance failed.
    Failover,

    /// Catch-up run for a trigger that fired while the scheduler was unavailable.
    Misfired,
}

impl ExecutionType {
    /// Returns the token used in the composite task identifier.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Failover => "FAILOVER",
            Self::Misfired => "MISFIRED",
        }
    }
}

impl fmt::Display for ExecutionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionType {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "READY" => Ok(Self::Ready),
            "FAILOVER" => Ok(Self::Failover),
            "MISFIRED" => Ok(Self::Misfired),
            other => Err(IdError::InvalidExecutionType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ExecutionType::Ready, "READY")]
    #[case(ExecutionType::Failover, "FAILOVER")]
    #[case(ExecutionType::Misfired, "MISFIRED")]
    fn test_token_matches_serde(#[case] kind: ExecutionType, #[case] token: &str) {
        assert_eq!(kind.as_str(), token);
        assert_eq!(token.parse::<ExecutionType>().unwrap(), kind);
        assert_eq!(serde_json::to_string(&kind).unwrap(), format!("\"{token}\""));
    }

    #[test]
    fn test_unknown_token_rejected() {
        let err = "ready".parse::<ExecutionType>().unwrap_err();
        assert_eq!(err, IdError::InvalidExecutionType("ready".to_string()));
    }
}
