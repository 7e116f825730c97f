use std::fmt;

use crate::errors::{KafkaError, ValidationError};
use crate::utils::{require_non_empty, require_non_negative, wire_enum};

/// Offset is not set: used for partitions where an offset makes no sense.
pub const OFFSET_INVALID: i64 = -1001;
/// Offset of the first record in a partition.
pub const OFFSET_BEGINNING: i64 = -2;
/// Offset right after the last record in a partition.
pub const OFFSET_END: i64 = -1;

/// A partition of a topic.
///
/// This is the natural key of partition-level admin operations.
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TopicPartition {
    pub topic: String,
    pub partition: i32,
}

impl TopicPartition {
    pub fn new<T: Into<String>>(topic: T, partition: i32) -> Self {
        Self {
            topic: topic.into(),
            partition,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(&self.topic, "topic")?;
        require_non_negative(self.partition, "partition")
    }
}

impl fmt::Display for TopicPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.topic, self.partition)
    }
}

/// A partition of a topic, together with an offset in it.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TopicPartitionOffset {
    pub topic: String,
    pub partition: i32,

    /// Offset, or [`OFFSET_INVALID`] when not set.
    pub offset: i64,

    /// Metadata committed together with the offset.
    pub metadata: Option<String>,

    pub leader_epoch: Option<i32>,

    /// Partition-level error, only ever set in results.
    pub error: Option<KafkaError>,
}

impl TopicPartitionOffset {
    pub fn new<T: Into<String>>(topic: T, partition: i32, offset: i64) -> Self {
        Self {
            topic: topic.into(),
            partition,
            offset,
            metadata: None,
            leader_epoch: None,
            error: None,
        }
    }

    /// Same as [`Self::new`], with [`OFFSET_INVALID`] as offset.
    pub fn without_offset<T: Into<String>>(topic: T, partition: i32) -> Self {
        Self::new(topic, partition, OFFSET_INVALID)
    }

    pub fn topic_partition(&self) -> TopicPartition {
        TopicPartition::new(self.topic.clone(), self.partition)
    }
}

wire_enum! {
    /// Isolation level of a list offsets request.
    pub enum IsolationLevel {
        /// Also see records of transactions not committed yet.
        ReadUncommitted = 0 => "READ_UNCOMMITTED",
        /// Only see records of committed transactions.
        ReadCommitted = 1 => "READ_COMMITTED",
    }
}

wire_enum! {
    /// Kind of leader election to perform.
    pub enum ElectionType {
        Preferred = 0 => "PREFERRED",
        Unclean = 1 => "UNCLEAN",
    }
}

const OFFSET_SPEC_MAX_TIMESTAMP: i64 = -3;
const OFFSET_SPEC_EARLIEST: i64 = -2;
const OFFSET_SPEC_LATEST: i64 = -1;

/// What offset a list offsets request is looking for, in a partition.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OffsetSpec {
    /// Offset of the first record.
    Earliest,
    /// Offset after the last record.
    Latest,
    /// Offset of the record with the highest timestamp.
    MaxTimestamp,
    /// Earliest offset whose timestamp is greater than or equal to the given one (milliseconds).
    Timestamp(i64),
}

impl OffsetSpec {
    /// Wire-level value: a (non-negative) timestamp, or a negative marker constant.
    pub fn value(&self) -> i64 {
        match self {
            OffsetSpec::Earliest => OFFSET_SPEC_EARLIEST,
            OffsetSpec::Latest => OFFSET_SPEC_LATEST,
            OffsetSpec::MaxTimestamp => OFFSET_SPEC_MAX_TIMESTAMP,
            OffsetSpec::Timestamp(ts) => *ts,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        match self {
            OffsetSpec::Timestamp(ts) => require_non_negative(*ts, "timestamp"),
            _ => Ok(()),
        }
    }
}

impl TryFrom<i64> for OffsetSpec {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            OFFSET_SPEC_EARLIEST => Ok(OffsetSpec::Earliest),
            OFFSET_SPEC_LATEST => Ok(OffsetSpec::Latest),
            OFFSET_SPEC_MAX_TIMESTAMP => Ok(OffsetSpec::MaxTimestamp),
            ts if ts >= 0 => Ok(OffsetSpec::Timestamp(ts)),
            other => Err(other),
        }
    }
}

/// Result of a list offsets request, for one partition.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListOffsetsResultInfo {
    pub offset: i64,

    /// Timestamp (milliseconds) of the record at [`Self::offset`], `-1` if not available.
    pub timestamp: i64,

    pub leader_epoch: Option<i32>,
}

/// Result of a delete records request, for one partition.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeletedRecords {
    /// The "low watermark" of the partition, after the deletion: the first offset still available.
    pub low_watermark: i64,
}
