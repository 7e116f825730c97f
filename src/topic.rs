use std::collections::BTreeMap;

use crate::acl::AclOperation;
use crate::cluster::Node;
use crate::errors::ValidationError;
use crate::utils::require_non_empty;

/// Lets the broker decide, for [`NewTopic::num_partitions`] and [`NewTopic::replication_factor`].
pub const BROKER_DEFAULT: i32 = -1;

/// Specification of a topic to create.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NewTopic {
    pub topic: String,

    /// Number of partitions, or [`BROKER_DEFAULT`].
    pub num_partitions: i32,

    /// Replication factor, or [`BROKER_DEFAULT`]. Must be [`BROKER_DEFAULT`]
    /// when [`Self::replica_assignment`] is given.
    pub replication_factor: i32,

    /// Explicit replica assignment: one list of broker ids per partition.
    pub replica_assignment: Vec<Vec<i32>>,

    /// Topic configuration (e.g. `cleanup.policy`).
    pub config: BTreeMap<String, String>,
}

impl NewTopic {
    pub fn new<T: Into<String>>(topic: T, num_partitions: i32, replication_factor: i32) -> Self {
        Self {
            topic: topic.into(),
            num_partitions,
            replication_factor,
            replica_assignment: Vec::new(),
            config: BTreeMap::new(),
        }
    }

    pub fn set<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(&self.topic, "topic")?;
        require_count_or_default(self.num_partitions, "num_partitions")?;
        require_count_or_default(self.replication_factor, "replication_factor")?;

        if !self.replica_assignment.is_empty() {
            if self.replication_factor != BROKER_DEFAULT {
                return Err(ValidationError::FieldNotAllowed {
                    entity: "NewTopic",
                    field: "replication_factor",
                });
            }
            if self.replica_assignment.len() as i32 != self.num_partitions {
                return Err(ValidationError::ReplicaAssignmentMismatch {
                    topic: self.topic.clone(),
                    assigned: self.replica_assignment.len(),
                    expected: self.num_partitions,
                });
            }
        }

        Ok(())
    }
}

/// Specification of partitions to add to an existing topic.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NewPartitions {
    pub topic: String,

    /// Total number of partitions after the operation (not the number of partitions to add).
    pub new_total_count: i32,

    /// Explicit replica assignment for the added partitions: one list of broker ids per partition.
    pub replica_assignment: Vec<Vec<i32>>,
}

impl NewPartitions {
    pub fn new<T: Into<String>>(topic: T, new_total_count: i32) -> Self {
        Self {
            topic: topic.into(),
            new_total_count,
            replica_assignment: Vec::new(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(&self.topic, "topic")?;
        if self.new_total_count < 1 {
            return Err(ValidationError::NonPositiveValue {
                field: "new_total_count",
                value: self.new_total_count.into(),
            });
        }
        if self.replica_assignment.iter().any(Vec::is_empty) {
            return Err(ValidationError::EmptyCollection("replica broker id"));
        }

        Ok(())
    }
}

fn require_count_or_default(value: i32, field: &'static str) -> Result<(), ValidationError> {
    if value == BROKER_DEFAULT || value >= 1 {
        return Ok(());
    }

    Err(ValidationError::NonPositiveValue {
        field,
        value: value.into(),
    })
}

/// Description of a partition of a topic.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TopicPartitionInfo {
    pub id: i32,

    /// Leader of the partition, if any is currently elected.
    pub leader: Option<Node>,

    pub replicas: Vec<Node>,

    /// In-Sync Replicas.
    pub isr: Vec<Node>,
}

/// Description of a topic.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TopicDescription {
    pub name: String,
    pub topic_id: Option<String>,
    pub is_internal: bool,
    pub partitions: Vec<TopicPartitionInfo>,

    /// Only set when requested with [`AdminOptions::include_authorized_operations`].
    ///
    /// [`AdminOptions::include_authorized_operations`]: crate::AdminOptions::include_authorized_operations
    pub authorized_operations: Option<Vec<AclOperation>>,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::utils::is_thread_safe;

    #[rstest]
    #[case(NewTopic::new("orders", 3, 2), Ok(()))]
    #[case(NewTopic::new("orders", BROKER_DEFAULT, BROKER_DEFAULT), Ok(()))]
    #[case(NewTopic::new("", 3, 2), Err(ValidationError::EmptyField("topic")))]
    #[case(NewTopic::new("orders", 0, 2), Err(ValidationError::NonPositiveValue { field: "num_partitions", value: 0 }))]
    #[case(
        NewTopic::new("orders", 3, -2),
        Err(ValidationError::NonPositiveValue { field: "replication_factor", value: -2 })
    )]
    fn new_topic_validation(#[case] topic: NewTopic, #[case] expected: Result<(), ValidationError>) {
        assert_eq!(topic.validate(), expected);
    }

    #[test]
    fn replica_assignment_must_cover_every_partition() {
        let mut topic = NewTopic::new("orders", 2, BROKER_DEFAULT);
        topic.replica_assignment = vec![vec![1, 2]];
        assert_eq!(
            topic.validate(),
            Err(ValidationError::ReplicaAssignmentMismatch {
                topic: "orders".into(),
                assigned: 1,
                expected: 2
            })
        );

        topic.replica_assignment.push(vec![2, 3]);
        assert!(topic.validate().is_ok());

        topic.replication_factor = 2;
        assert!(topic.validate().is_err());
    }

    #[test]
    fn new_partitions_validation() {
        assert!(NewPartitions::new("orders", 4).validate().is_ok());
        assert!(NewPartitions::new("orders", 0).validate().is_err());

        let mut p = NewPartitions::new("orders", 4);
        p.replica_assignment = vec![vec![1], vec![]];
        assert_eq!(p.validate(), Err(ValidationError::EmptyCollection("replica broker id")));
    }

    #[test]
    fn test_types_thread_safety() {
        is_thread_safe::<NewTopic>();
        is_thread_safe::<NewPartitions>();
        is_thread_safe::<TopicDescription>();
        is_thread_safe::<TopicPartitionInfo>();
    }
}
