//! Composite task identity.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::{ExecutionType, IdError};

/// Separator between identifier segments.
pub const DELIMITER: &str = "@-@";

const SEGMENTS: usize = 5;

const RESERVED: char = '@';

/// Fully-qualified runtime identity of one launched task instance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskIdentity {
    job_name: String,
    sharding_item: u32,
    execution_type: ExecutionType,
    slave_id: String,
    uuid: Uuid,
}

impl TaskIdentity {
    /// Creates an identity for a new task instance with a fresh uuid.
    pub fn new(
        job_name: impl Into<String>,
        sharding_item: u32,
        execution_type: ExecutionType,
        slave_id: impl Into<String>,
    ) -> Result<Self, IdError> {
        Self::from_parts(
            job_name,
            sharding_item,
            execution_type,
            slave_id,
            Uuid::new_v4(),
        )
    }

    /// Creates an identity from already-known parts.
    pub fn from_parts(
        job_name: impl Into<String>,
        sharding_item: u32,
        execution_type: ExecutionType,
        slave_id: impl Into<String>,
        uuid: Uuid,
    ) -> Result<Self, IdError> {
        let job_name = job_name.into();
        let slave_id = slave_id.into();
        validate_job_name(&job_name)?;
        validate_segment("slave_id", &slave_id)?;

        Ok(Self {
            job_name,
            sharding_item,
            execution_type,
            slave_id,
            uuid,
        })
    }

    /// Parses an identity from its composite string form.
    pub fn parse(s: &str) -> Result<Self, IdError> {
        if s.is_empty() {
            return Err(IdError::Empty);
        }

        let segments: Vec<&str> = s.split(DELIMITER).collect();
        let [job_name, sharding_item, execution_type, slave_id, uuid] = segments[..] else {
            return Err(IdError::SegmentCount {
                expected: SEGMENTS,
                actual: segments.len(),
            });
        };

        let sharding_item = sharding_item
            .parse::<u32>()
            .map_err(|_| IdError::InvalidShardingItem(sharding_item.to_string()))?;
        let execution_type = execution_type.parse::<ExecutionType>()?;
        let uuid = uuid
            .parse::<Uuid>()
            .map_err(|e| IdError::InvalidUuid(e.to_string()))?;

        Self::from_parts(job_name, sharding_item, execution_type, slave_id, uuid)
    }

    /// Returns the canonical composite identifier.
    #[must_use]
    pub fn id(&self) -> String {
        self.to_string()
    }

    /// Returns the shard key, `{job_name}@-@{sharding_item}`.
    ///
    /// Two launches of the same shard share a meta info even though their
    /// identifiers differ.
    #[must_use]
    pub fn meta_info(&self) -> String {
        format!("{}{}{}", self.job_name, DELIMITER, self.sharding_item)
    }

    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    pub fn sharding_item(&self) -> u32 {
        self.sharding_item
    }

    pub fn execution_type(&self) -> ExecutionType {
        self.execution_type
    }

    pub fn slave_id(&self) -> &str {
        &self.slave_id
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }
}

/// Check that `job_name` can be embedded in a task identifier.
pub fn validate_job_name(job_name: &str) -> Result<(), IdError> {
    validate_segment("job_name", job_name)
}

// Any '@' could pair with a neighbouring '-' into a delimiter once joined.
fn validate_segment(segment: &'static str, value: &str) -> Result<(), IdError> {
    if value.is_empty() {
        return Err(IdError::EmptySegment { segment });
    }
    if value.contains(RESERVED) {
        return Err(IdError::ReservedCharacter { segment });
    }
    Ok(())
}

impl fmt::Display for TaskIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{job}{d}{item}{d}{kind}{d}{slave}{d}{uuid}",
            job = self.job_name,
            item = self.sharding_item,
            kind = self.execution_type,
            slave = self.slave_id,
            uuid = self.uuid,
            d = DELIMITER,
        )
    }
}

impl FromStr for TaskIdentity {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for TaskIdentity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for TaskIdentity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
