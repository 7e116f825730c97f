use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::acl::{AclBinding, AclBindingFilter};
use crate::aggregate::AggregateCompleter;
use crate::cluster::DescribeClusterResult;
use crate::config::{ConfigEntries, ConfigResource, ResourceType};
use crate::errors::KafkaError;
use crate::group::{ConsumerGroupDescription, ConsumerGroupTopicPartitions, ListConsumerGroupsResult};
use crate::offsets::{
    DeletedRecords, ElectionType, ListOffsetsResultInfo, OffsetSpec, TopicPartition, TopicPartitionOffset,
};
use crate::options::{AdminOperation, AdminOptions};
use crate::scram::{UserScramCredentialAlteration, UserScramCredentialsDescription};
use crate::topic::{NewPartitions, NewTopic, TopicDescription};

/// The client that actually talks to the Kafka cluster (for example, on top of `librdkafka`).
///
/// Implementations receive a validated request, and must eventually
/// [`resolve`](AggregateCompleter::resolve) the given completion, from any thread:
/// with a per-entity result for every entity of the request, or with a single request-level error.
pub trait NativeClient: Send + Sync {
    fn submit(&self, request: AdminRequest, options: AdminOptions, completion: AggregateCompleter);
}

impl<T: NativeClient + ?Sized> NativeClient for Arc<T> {
    fn submit(&self, request: AdminRequest, options: AdminOptions, completion: AggregateCompleter) {
        (**self).submit(request, options, completion)
    }
}

/// A validated admin request, with its entities in submission order.
#[derive(Debug, Clone, PartialEq)]
pub enum AdminRequest {
    CreateTopics(Vec<NewTopic>),
    DeleteTopics(Vec<String>),
    CreatePartitions(Vec<NewPartitions>),
    DescribeConfigs(Vec<ConfigResource>),
    AlterConfigs(Vec<ConfigResource>),
    IncrementalAlterConfigs(Vec<ConfigResource>),
    CreateAcls(Vec<AclBinding>),
    DescribeAcls(AclBindingFilter),
    DeleteAcls(Vec<AclBindingFilter>),
    ListConsumerGroups,
    DescribeConsumerGroups(Vec<String>),
    DeleteConsumerGroups(Vec<String>),
    ListConsumerGroupOffsets(Vec<ConsumerGroupTopicPartitions>),
    AlterConsumerGroupOffsets(Vec<ConsumerGroupTopicPartitions>),
    DescribeTopics(Vec<String>),
    DescribeCluster,

    /// `None` describes the credentials of every user.
    DescribeUserScramCredentials(Option<Vec<String>>),

    AlterUserScramCredentials(Vec<UserScramCredentialAlteration>),
    ListOffsets(Vec<(TopicPartition, OffsetSpec)>),
    DeleteRecords(Vec<TopicPartitionOffset>),
    ElectLeaders {
        election_type: ElectionType,

        /// `None` elects leaders for every partition.
        partitions: Option<Vec<TopicPartition>>,
    },
}

impl AdminRequest {
    pub fn operation(&self) -> AdminOperation {
        match self {
            AdminRequest::CreateTopics(_) => AdminOperation::CreateTopics,
            AdminRequest::DeleteTopics(_) => AdminOperation::DeleteTopics,
            AdminRequest::CreatePartitions(_) => AdminOperation::CreatePartitions,
            AdminRequest::DescribeConfigs(_) => AdminOperation::DescribeConfigs,
            AdminRequest::AlterConfigs(_) => AdminOperation::AlterConfigs,
            AdminRequest::IncrementalAlterConfigs(_) => AdminOperation::IncrementalAlterConfigs,
            AdminRequest::CreateAcls(_) => AdminOperation::CreateAcls,
            AdminRequest::DescribeAcls(_) => AdminOperation::DescribeAcls,
            AdminRequest::DeleteAcls(_) => AdminOperation::DeleteAcls,
            AdminRequest::ListConsumerGroups => AdminOperation::ListConsumerGroups,
            AdminRequest::DescribeConsumerGroups(_) => AdminOperation::DescribeConsumerGroups,
            AdminRequest::DeleteConsumerGroups(_) => AdminOperation::DeleteConsumerGroups,
            AdminRequest::ListConsumerGroupOffsets(_) => AdminOperation::ListConsumerGroupOffsets,
            AdminRequest::AlterConsumerGroupOffsets(_) => AdminOperation::AlterConsumerGroupOffsets,
            AdminRequest::DescribeTopics(_) => AdminOperation::DescribeTopics,
            AdminRequest::DescribeCluster => AdminOperation::DescribeCluster,
            AdminRequest::DescribeUserScramCredentials(_) => AdminOperation::DescribeUserScramCredentials,
            AdminRequest::AlterUserScramCredentials(_) => AdminOperation::AlterUserScramCredentials,
            AdminRequest::ListOffsets(_) => AdminOperation::ListOffsets,
            AdminRequest::DeleteRecords(_) => AdminOperation::DeleteRecords,
            AdminRequest::ElectLeaders { .. } => AdminOperation::ElectLeaders,
        }
    }
}

/// Natural key identifying an entity in an [`AdminResponse::Keyed`] response.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum EntityKey {
    /// Topic name, consumer group id or user name.
    Name(String),
    Resource(ResourceType, String),
    Partition(String, i32),
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Name(name) => f.write_str(name),
            EntityKey::Resource(restype, name) => write!(f, "{restype}:{name}"),
            EntityKey::Partition(topic, partition) => write!(f, "{topic}[{partition}]"),
        }
    }
}

impl From<&str> for EntityKey {
    fn from(name: &str) -> Self {
        EntityKey::Name(name.to_string())
    }
}

impl From<&ConfigResource> for EntityKey {
    fn from(resource: &ConfigResource) -> Self {
        EntityKey::Resource(resource.restype, resource.name.clone())
    }
}

impl From<&TopicPartition> for EntityKey {
    fn from(tp: &TopicPartition) -> Self {
        EntityKey::Partition(tp.topic.clone(), tp.partition)
    }
}

/// Handle keys that identify entities of keyed responses.
pub(crate) trait AsEntityKey {
    fn entity_key(&self) -> EntityKey;
}

impl AsEntityKey for String {
    fn entity_key(&self) -> EntityKey {
        EntityKey::from(self.as_str())
    }
}

impl AsEntityKey for ConfigResource {
    fn entity_key(&self) -> EntityKey {
        EntityKey::from(self)
    }
}

impl AsEntityKey for TopicPartition {
    fn entity_key(&self) -> EntityKey {
        EntityKey::from(self)
    }
}

/// Outcome of the work requested for one entity.
pub type EntityResult = Result<ResultValue, KafkaError>;

/// What the native client completes a request with, when the request as a whole succeeded.
#[derive(Debug, Clone, PartialEq)]
pub enum AdminResponse {
    /// One record per entity, identified by its natural key, in any order.
    ///
    /// Used by topic, partition, config, SCRAM, list offsets and delete records requests.
    Keyed(Vec<(EntityKey, EntityResult)>),

    /// One record per entity, in submission order.
    ///
    /// Used by ACL, consumer group and describe topics requests.
    Ordered(Vec<EntityResult>),

    /// A single value for the whole request.
    ///
    /// Used by describe ACLs, list consumer groups, describe cluster and elect leaders requests.
    Single(ResultValue),
}

impl AdminResponse {
    pub(crate) fn shape(&self) -> &'static str {
        match self {
            AdminResponse::Keyed(_) => "keyed",
            AdminResponse::Ordered(_) => "ordered",
            AdminResponse::Single(_) => "single",
        }
    }
}

/// Payload of a successful entity (or single) result.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultValue {
    /// Success with no payload (e.g. a topic was created).
    None,
    Configs(ConfigEntries),
    AclBindings(Vec<AclBinding>),
    ConsumerGroups(ListConsumerGroupsResult),
    ConsumerGroupDescription(ConsumerGroupDescription),
    ConsumerGroupOffsets(ConsumerGroupTopicPartitions),
    TopicDescription(TopicDescription),
    Cluster(DescribeClusterResult),
    ScramCredentials(UserScramCredentialsDescription),
    ListOffsets(ListOffsetsResultInfo),
    DeletedRecords(DeletedRecords),

    /// Per partition election outcome: `None` if the leader was elected.
    Elections(HashMap<TopicPartition, Option<KafkaError>>),
}

impl ResultValue {
    pub fn kind(&self) -> &'static str {
        match self {
            ResultValue::None => "None",
            ResultValue::Configs(_) => "Configs",
            ResultValue::AclBindings(_) => "AclBindings",
            ResultValue::ConsumerGroups(_) => "ConsumerGroups",
            ResultValue::ConsumerGroupDescription(_) => "ConsumerGroupDescription",
            ResultValue::ConsumerGroupOffsets(_) => "ConsumerGroupOffsets",
            ResultValue::TopicDescription(_) => "TopicDescription",
            ResultValue::Cluster(_) => "Cluster",
            ResultValue::ScramCredentials(_) => "ScramCredentials",
            ResultValue::ListOffsets(_) => "ListOffsets",
            ResultValue::DeletedRecords(_) => "DeletedRecords",
            ResultValue::Elections(_) => "Elections",
        }
    }
}

/// Typed payload a handle resolves with, extracted from a [`ResultValue`].
///
/// On mismatch, the value is given back so the caller can report what it got instead.
pub(crate) trait FromResultValue: Sized {
    fn from_result_value(value: ResultValue) -> Result<Self, ResultValue>;
}

impl FromResultValue for () {
    fn from_result_value(value: ResultValue) -> Result<Self, ResultValue> {
        match value {
            ResultValue::None => Ok(()),
            other => Err(other),
        }
    }
}

macro_rules! from_result_value {
    ($($target:ty => $variant:ident),+ $(,)?) => {
        $(
            impl FromResultValue for $target {
                fn from_result_value(value: ResultValue) -> Result<Self, ResultValue> {
                    match value {
                        ResultValue::$variant(v) => Ok(v),
                        other => Err(other),
                    }
                }
            }
        )+
    };
}

from_result_value! {
    ConfigEntries => Configs,
    Vec<AclBinding> => AclBindings,
    ListConsumerGroupsResult => ConsumerGroups,
    ConsumerGroupDescription => ConsumerGroupDescription,
    ConsumerGroupTopicPartitions => ConsumerGroupOffsets,
    TopicDescription => TopicDescription,
    DescribeClusterResult => Cluster,
    UserScramCredentialsDescription => ScramCredentials,
    ListOffsetsResultInfo => ListOffsets,
    DeletedRecords => DeletedRecords,
    HashMap<TopicPartition, Option<KafkaError>> => Elections,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::is_thread_safe;

    #[test]
    fn entity_keys() {
        let resource = ConfigResource::new(ResourceType::Topic, "orders");
        assert_eq!(resource.entity_key(), EntityKey::Resource(ResourceType::Topic, "orders".into()));
        assert_eq!(resource.entity_key().to_string(), "TOPIC:orders");

        let tp = TopicPartition::new("orders", 3);
        assert_eq!(tp.entity_key(), EntityKey::Partition("orders".into(), 3));
        assert_eq!(tp.entity_key().to_string(), "orders[3]");

        assert_eq!("billing".to_string().entity_key(), EntityKey::from("billing"));
    }

    #[test]
    fn typed_extraction() {
        assert_eq!(<()>::from_result_value(ResultValue::None), Ok(()));
        assert_eq!(
            DeletedRecords::from_result_value(ResultValue::DeletedRecords(DeletedRecords { low_watermark: 42 })),
            Ok(DeletedRecords { low_watermark: 42 })
        );

        let mismatch = <()>::from_result_value(ResultValue::AclBindings(vec![])).unwrap_err();
        assert_eq!(mismatch.kind(), "AclBindings");
    }

    #[test]
    fn request_operation() {
        assert_eq!(AdminRequest::DescribeCluster.operation(), AdminOperation::DescribeCluster);
        assert_eq!(
            AdminRequest::ElectLeaders {
                election_type: ElectionType::Preferred,
                partitions: None
            }
            .operation(),
            AdminOperation::ElectLeaders
        );
        assert_eq!(
            AdminRequest::DescribeUserScramCredentials(None).operation(),
            AdminOperation::DescribeUserScramCredentials
        );
    }

    #[test]
    fn test_types_thread_safety() {
        is_thread_safe::<AdminRequest>();
        is_thread_safe::<AdminResponse>();
        is_thread_safe::<EntityKey>();
    }
}
