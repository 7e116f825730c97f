use std::fmt;

use crate::acl::AclOperation;
use crate::cluster::Node;
use crate::errors::{KafkaError, ValidationError};
use crate::offsets::{TopicPartition, TopicPartitionOffset, OFFSET_INVALID};
use crate::utils::{require_at_least_one, require_non_empty, require_non_negative, wire_enum};

wire_enum! {
    /// State of a consumer group, as tracked by the [Group Coordinator].
    ///
    /// [Group Coordinator]: https://github.com/apache/kafka/blob/trunk/core/src/main/scala/kafka/coordinator/group/GroupCoordinator.scala
    pub enum ConsumerGroupState {
        Unknown = 0 => "UNKNOWN",
        PreparingRebalancing = 1 => "PREPARING_REBALANCING",
        CompletingRebalancing = 2 => "COMPLETING_REBALANCING",
        Stable = 3 => "STABLE",
        Dead = 4 => "DEAD",
        Empty = 5 => "EMPTY",
    }
}

wire_enum! {
    /// Rebalance protocol a consumer group uses.
    pub enum ConsumerGroupType {
        Unknown = 0 => "UNKNOWN",
        /// The protocol introduced by [KIP-848].
        ///
        /// [KIP-848]: https://cwiki.apache.org/confluence/display/KAFKA/KIP-848%3A+The+Next+Generation+of+the+Consumer+Rebalance+Protocol
        Consumer = 1 => "CONSUMER",
        Classic = 2 => "CLASSIC",
    }
}

/// A consumer group, as returned when listing consumer groups.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConsumerGroupListing {
    pub group_id: String,

    /// Is this a "simple" group, i.e. one used only to commit offsets, with no members?
    pub is_simple_consumer_group: bool,

    pub state: ConsumerGroupState,
    pub group_type: ConsumerGroupType,
}

/// Result of listing consumer groups.
///
/// Listing queries every broker: the brokers that failed are reported in [`Self::errors`],
/// without failing the whole listing.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListConsumerGroupsResult {
    pub valid: Vec<ConsumerGroupListing>,
    pub errors: Vec<KafkaError>,
}

/// Partitions assigned to a consumer group member.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemberAssignment {
    pub topic_partitions: Vec<TopicPartition>,
}

/// Description of a Consumer Group Member.
///
/// Note that the words "Member" and "Consumer" can be used interchangeably in this context.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemberDescription {
    /// Consumer Group Member identifier.
    pub member_id: String,

    /// Consumer Client identifier.
    ///
    /// This corresponds to the Kafka (client) configuration option `client.id`.
    pub client_id: String,

    /// Consumer Client host.
    ///
    /// Usually its IP.
    pub host: String,

    pub assignment: MemberAssignment,

    /// Static membership identifier (`group.instance.id`), if configured.
    pub group_instance_id: Option<String>,
}

/// Description of a consumer group.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConsumerGroupDescription {
    pub group_id: String,
    pub is_simple_consumer_group: bool,
    pub members: Vec<MemberDescription>,

    /// Partition assignor in use (e.g. `range`, `cooperative-sticky`).
    pub partition_assignor: String,

    pub state: ConsumerGroupState,
    pub group_type: ConsumerGroupType,

    /// Broker acting as [Group Coordinator] for this group.
    ///
    /// [Group Coordinator]: https://github.com/apache/kafka/blob/trunk/core/src/main/scala/kafka/coordinator/group/GroupCoordinator.scala
    pub coordinator: Option<Node>,

    /// Only set when requested with [`AdminOptions::include_authorized_operations`].
    ///
    /// [`AdminOptions::include_authorized_operations`]: crate::AdminOptions::include_authorized_operations
    pub authorized_operations: Option<Vec<AclOperation>>,
}

/// A consumer group, together with (some of) its topic partitions and their offsets.
///
/// Used both as request (list and alter consumer group offsets) and as result.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConsumerGroupTopicPartitions {
    pub group_id: String,

    /// When listing offsets, `None` means "all the partitions the group committed offsets for".
    pub topic_partitions: Option<Vec<TopicPartitionOffset>>,
}

impl ConsumerGroupTopicPartitions {
    pub fn new<G: Into<String>>(group_id: G, topic_partitions: Option<Vec<TopicPartitionOffset>>) -> Self {
        Self {
            group_id: group_id.into(),
            topic_partitions,
        }
    }

    /// Validation for list requests: partitions are optional, but when given they must not carry offsets.
    pub(crate) fn validate_for_list(&self) -> Result<(), ValidationError> {
        require_non_empty(&self.group_id, "group_id")?;

        if let Some(topic_partitions) = &self.topic_partitions {
            require_at_least_one(topic_partitions, "topic partition")?;
            for tp in topic_partitions {
                tp.topic_partition().validate()?;
                if tp.offset != OFFSET_INVALID {
                    return Err(ValidationError::FieldNotAllowed {
                        entity: "topic partition",
                        field: "offset",
                    });
                }
            }
        }

        Ok(())
    }

    /// Validation for alter requests: partitions are required, each with a non-negative offset.
    pub(crate) fn validate_for_alter(&self) -> Result<(), ValidationError> {
        require_non_empty(&self.group_id, "group_id")?;

        let topic_partitions = self.topic_partitions.as_ref().ok_or(ValidationError::MissingField {
            entity: "ConsumerGroupTopicPartitions",
            field: "topic_partitions",
        })?;
        require_at_least_one(topic_partitions, "topic partition")?;
        for tp in topic_partitions {
            tp.topic_partition().validate()?;
            require_non_negative(tp.offset, "offset")?;
        }

        Ok(())
    }
}

impl fmt::Display for ConsumerGroupTopicPartitions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.group_id)
    }
}
