//! Fans Kafka Admin API batch requests out into independently awaitable, per-entity handles.
//!
//! An [`AdminClient`] validates a batch request (create these topics, describe those consumer groups, ...),
//! submits it to a [`NativeClient`] in one call, and returns one [`CompletionHandle`] per entity.
//! When the native call completes, its outcome is split across the handles: each resolves with the
//! result of its own entity, or with the error that failed the whole request.
//!
//! ```ignore
//! let client = AdminClient::new(native);
//! let handles = client.create_topics(vec![NewTopic::new("orders", 3, 2)], &AdminOptions::new())?;
//!
//! for (topic, outcome) in handles.wait_all() {
//!     match outcome {
//!         Ok(()) => println!("Created {topic}"),
//!         Err(e) if e.code() == Some(ErrorCode::TopicAlreadyExists) => println!("{topic} already exists"),
//!         Err(e) => eprintln!("Failed to create {topic}: {e}"),
//!     }
//! }
//! ```

mod acl;
mod admin_client;
mod aggregate;
mod cluster;
mod config;
mod errors;
mod fan_out;
mod group;
mod handle;
mod native;
mod offsets;
mod options;
mod scram;
mod topic;
mod utils;

#[cfg(test)]
mod testing;

pub use acl::{AclBinding, AclBindingFilter, AclOperation, AclPermissionType, ResourcePatternType};
pub use admin_client::AdminClient;
pub use aggregate::{AggregateCompleter, AggregateOutcome};
pub use cluster::{DescribeClusterResult, Node};
pub use config::{AlterConfigOpType, ConfigEntries, ConfigEntry, ConfigResource, ConfigSource, ResourceType};
pub use errors::{AdminError, AdminErrorKind, ErrorCode, KafkaError, ValidationError};
pub use group::{
    ConsumerGroupDescription, ConsumerGroupListing, ConsumerGroupState, ConsumerGroupTopicPartitions,
    ConsumerGroupType, ListConsumerGroupsResult, MemberAssignment, MemberDescription,
};
pub use handle::{CompletionHandle, HandleMap, HandleState};
pub use native::{AdminRequest, AdminResponse, EntityKey, EntityResult, NativeClient, ResultValue};
pub use offsets::{
    DeletedRecords, ElectionType, IsolationLevel, ListOffsetsResultInfo, OffsetSpec, TopicPartition,
    TopicPartitionOffset, OFFSET_BEGINNING, OFFSET_END, OFFSET_INVALID,
};
pub use options::{AdminOperation, AdminOptions};
pub use scram::{ScramCredentialInfo, ScramMechanism, UserScramCredentialAlteration, UserScramCredentialsDescription};
pub use topic::{NewPartitions, NewTopic, TopicDescription, TopicPartitionInfo, BROKER_DEFAULT};
