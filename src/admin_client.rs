use std::collections::HashMap;

use log::{debug, warn};

use crate::acl::{AclBinding, AclBindingFilter};
use crate::aggregate::{AggregateCompleter, FanOut};
use crate::cluster::DescribeClusterResult;
use crate::config::{require_single_broker, ConfigEntries, ConfigResource};
use crate::errors::{KafkaError, ValidationError};
use crate::fan_out;
use crate::group::{ConsumerGroupDescription, ConsumerGroupTopicPartitions, ListConsumerGroupsResult};
use crate::handle::{CompletionHandle, HandleMap};
use crate::native::{AdminRequest, NativeClient};
use crate::offsets::{
    DeletedRecords, ElectionType, ListOffsetsResultInfo, OffsetSpec, TopicPartition, TopicPartitionOffset, OFFSET_END,
};
use crate::options::{AdminOperation, AdminOptions};
use crate::scram::{ScramMechanism, UserScramCredentialAlteration, UserScramCredentialsDescription};
use crate::topic::{NewPartitions, NewTopic, TopicDescription};
use crate::utils::{
    require_at_least_one, require_non_empty, require_non_negative, require_unique, require_unique_by,
};

/// Dispatches batch admin requests to a [`NativeClient`], and fans their outcome out to
/// one [`CompletionHandle`] per entity.
///
/// Every method validates its input synchronously: a [`ValidationError`] is returned
/// before anything is submitted. Otherwise, exactly one request is submitted to the native client,
/// and the returned handles resolve once it completes.
///
/// A batch can partially succeed: each handle carries the outcome of its own entity.
pub struct AdminClient<N: NativeClient> {
    native: N,
}

impl<N: NativeClient> AdminClient<N> {
    pub fn new(native: N) -> Self {
        Self { native }
    }

    pub fn native(&self) -> &N {
        &self.native
    }

    fn dispatch<F: FanOut + 'static>(&self, request: AdminRequest, options: &AdminOptions, fan_out: F) {
        let operation = request.operation();
        debug!("Submitting {operation} request");

        let completion = AggregateCompleter::new(operation, Box::new(fan_out));
        self.native.submit(request, options.clone(), completion);
    }

    /// Creates topics.
    ///
    /// Handles are keyed by topic name. Supports the `operation_timeout` and `validate_only` options.
    pub fn create_topics(
        &self,
        new_topics: Vec<NewTopic>,
        options: &AdminOptions,
    ) -> Result<HandleMap<String, ()>, ValidationError> {
        let operation = AdminOperation::CreateTopics;
        options.validate_for(operation)?;

        require_at_least_one(&new_topics, "topic")?;
        new_topics.iter().try_for_each(NewTopic::validate)?;
        let topics: Vec<String> = new_topics.iter().map(|t| t.topic.clone()).collect();
        require_unique(&topics, "topic")?;

        let (handles, fan_out) = fan_out::keyed(operation, topics);
        self.dispatch(AdminRequest::CreateTopics(new_topics), options, fan_out);

        Ok(handles)
    }

    /// Deletes topics.
    ///
    /// Handles are keyed by topic name. Supports the `operation_timeout` option.
    pub fn delete_topics(
        &self,
        topics: &[&str],
        options: &AdminOptions,
    ) -> Result<HandleMap<String, ()>, ValidationError> {
        let operation = AdminOperation::DeleteTopics;
        options.validate_for(operation)?;
        let topics = names(topics, "topic")?;

        let (handles, fan_out) = fan_out::keyed(operation, topics.clone());
        self.dispatch(AdminRequest::DeleteTopics(topics), options, fan_out);

        Ok(handles)
    }

    /// Adds partitions to existing topics.
    ///
    /// Handles are keyed by topic name.
    pub fn create_partitions(
        &self,
        new_partitions: Vec<NewPartitions>,
        options: &AdminOptions,
    ) -> Result<HandleMap<String, ()>, ValidationError> {
        let operation = AdminOperation::CreatePartitions;
        options.validate_for(operation)?;

        require_at_least_one(&new_partitions, "topic")?;
        new_partitions.iter().try_for_each(NewPartitions::validate)?;
        let topics: Vec<String> = new_partitions.iter().map(|p| p.topic.clone()).collect();
        require_unique(&topics, "topic")?;

        let (handles, fan_out) = fan_out::keyed(operation, topics);
        self.dispatch(AdminRequest::CreatePartitions(new_partitions), options, fan_out);

        Ok(handles)
    }

    /// Describes the configuration of resources.
    ///
    /// Handles are keyed by resource, and resolve with its configuration entries.
    /// At most one [`ResourceType::Broker`] resource can be described per request.
    ///
    /// [`ResourceType::Broker`]: crate::ResourceType::Broker
    pub fn describe_configs(
        &self,
        resources: Vec<ConfigResource>,
        options: &AdminOptions,
    ) -> Result<HandleMap<ConfigResource, ConfigEntries>, ValidationError> {
        let operation = AdminOperation::DescribeConfigs;
        options.validate_for(operation)?;
        validate_resources(&resources, ConfigResource::validate)?;

        let (handles, fan_out) = fan_out::keyed(operation, resources.clone());
        self.dispatch(AdminRequest::DescribeConfigs(resources), options, fan_out);

        Ok(handles)
    }

    /// Replaces the configuration of resources with their `set_config` entries.
    ///
    /// Entries not given are reverted to their default.
    #[deprecated(note = "use `incremental_alter_configs`: alter configs replaces the whole configuration")]
    pub fn alter_configs(
        &self,
        resources: Vec<ConfigResource>,
        options: &AdminOptions,
    ) -> Result<HandleMap<ConfigResource, ()>, ValidationError> {
        let operation = AdminOperation::AlterConfigs;
        warn!("{operation} is deprecated: use {}", AdminOperation::IncrementalAlterConfigs);
        options.validate_for(operation)?;
        validate_resources(&resources, ConfigResource::validate)?;

        let (handles, fan_out) = fan_out::keyed(operation, resources.clone());
        self.dispatch(AdminRequest::AlterConfigs(resources), options, fan_out);

        Ok(handles)
    }

    /// Alters the configuration of resources, entry by entry, with [`ConfigResource::incremental_configs`].
    pub fn incremental_alter_configs(
        &self,
        resources: Vec<ConfigResource>,
        options: &AdminOptions,
    ) -> Result<HandleMap<ConfigResource, ()>, ValidationError> {
        let operation = AdminOperation::IncrementalAlterConfigs;
        options.validate_for(operation)?;
        validate_resources(&resources, ConfigResource::validate_incremental)?;

        let (handles, fan_out) = fan_out::keyed(operation, resources.clone());
        self.dispatch(AdminRequest::IncrementalAlterConfigs(resources), options, fan_out);

        Ok(handles)
    }

    pub fn create_acls(
        &self,
        acls: Vec<AclBinding>,
        options: &AdminOptions,
    ) -> Result<HandleMap<AclBinding, ()>, ValidationError> {
        let operation = AdminOperation::CreateAcls;
        options.validate_for(operation)?;

        require_at_least_one(&acls, "ACL binding")?;
        acls.iter().try_for_each(AclBinding::validate)?;
        require_unique(&acls, "ACL binding")?;

        let (handles, fan_out) = fan_out::ordered(operation, acls.clone());
        self.dispatch(AdminRequest::CreateAcls(acls), options, fan_out);

        Ok(handles)
    }

    /// Lists the ACL bindings matching `filter`.
    pub fn describe_acls(
        &self,
        filter: AclBindingFilter,
        options: &AdminOptions,
    ) -> Result<CompletionHandle<Vec<AclBinding>>, ValidationError> {
        let operation = AdminOperation::DescribeAcls;
        options.validate_for(operation)?;
        filter.validate()?;

        let (handle, fan_out) = fan_out::single(operation);
        self.dispatch(AdminRequest::DescribeAcls(filter), options, fan_out);

        Ok(handle)
    }

    /// Deletes the ACL bindings matching each filter.
    ///
    /// Handles are keyed by filter, and resolve with the bindings that were deleted.
    pub fn delete_acls(
        &self,
        filters: Vec<AclBindingFilter>,
        options: &AdminOptions,
    ) -> Result<HandleMap<AclBindingFilter, Vec<AclBinding>>, ValidationError> {
        let operation = AdminOperation::DeleteAcls;
        options.validate_for(operation)?;

        require_at_least_one(&filters, "ACL binding filter")?;
        filters.iter().try_for_each(AclBindingFilter::validate)?;
        require_unique(&filters, "ACL binding filter")?;

        let (handles, fan_out) = fan_out::ordered(operation, filters.clone());
        self.dispatch(AdminRequest::DeleteAcls(filters), options, fan_out);

        Ok(handles)
    }

    /// Lists the consumer groups of the cluster.
    ///
    /// Can be narrowed with the `states` and `types` options.
    pub fn list_consumer_groups(
        &self,
        options: &AdminOptions,
    ) -> Result<CompletionHandle<ListConsumerGroupsResult>, ValidationError> {
        let operation = AdminOperation::ListConsumerGroups;
        options.validate_for(operation)?;

        let (handle, fan_out) = fan_out::single(operation);
        self.dispatch(AdminRequest::ListConsumerGroups, options, fan_out);

        Ok(handle)
    }

    pub fn describe_consumer_groups(
        &self,
        group_ids: &[&str],
        options: &AdminOptions,
    ) -> Result<HandleMap<String, ConsumerGroupDescription>, ValidationError> {
        let operation = AdminOperation::DescribeConsumerGroups;
        options.validate_for(operation)?;
        let group_ids = names(group_ids, "group_id")?;

        let (handles, fan_out) = fan_out::ordered(operation, group_ids.clone());
        self.dispatch(AdminRequest::DescribeConsumerGroups(group_ids), options, fan_out);

        Ok(handles)
    }

    /// Deletes consumer groups. Only empty groups (i.e. without members) can be deleted.
    pub fn delete_consumer_groups(
        &self,
        group_ids: &[&str],
        options: &AdminOptions,
    ) -> Result<HandleMap<String, ()>, ValidationError> {
        let operation = AdminOperation::DeleteConsumerGroups;
        options.validate_for(operation)?;
        let group_ids = names(group_ids, "group_id")?;

        let (handles, fan_out) = fan_out::ordered(operation, group_ids.clone());
        self.dispatch(AdminRequest::DeleteConsumerGroups(group_ids), options, fan_out);

        Ok(handles)
    }

    /// Lists the committed offsets of a consumer group.
    ///
    /// Exactly one group is currently supported per request. The handle is keyed by group id.
    pub fn list_consumer_group_offsets(
        &self,
        requests: Vec<ConsumerGroupTopicPartitions>,
        options: &AdminOptions,
    ) -> Result<HandleMap<String, ConsumerGroupTopicPartitions>, ValidationError> {
        let operation = AdminOperation::ListConsumerGroupOffsets;
        options.validate_for(operation)?;
        require_single_group(operation, &requests)?;
        requests.iter().try_for_each(ConsumerGroupTopicPartitions::validate_for_list)?;

        let group_ids = requests.iter().map(|r| r.group_id.clone()).collect();
        let (handles, fan_out) = fan_out::ordered(operation, group_ids);
        self.dispatch(AdminRequest::ListConsumerGroupOffsets(requests), options, fan_out);

        Ok(handles)
    }

    /// Commits offsets for a consumer group.
    ///
    /// Exactly one group is currently supported per request. The handle is keyed by group id.
    pub fn alter_consumer_group_offsets(
        &self,
        requests: Vec<ConsumerGroupTopicPartitions>,
        options: &AdminOptions,
    ) -> Result<HandleMap<String, ConsumerGroupTopicPartitions>, ValidationError> {
        let operation = AdminOperation::AlterConsumerGroupOffsets;
        options.validate_for(operation)?;
        require_single_group(operation, &requests)?;
        requests.iter().try_for_each(ConsumerGroupTopicPartitions::validate_for_alter)?;

        let group_ids = requests.iter().map(|r| r.group_id.clone()).collect();
        let (handles, fan_out) = fan_out::ordered(operation, group_ids);
        self.dispatch(AdminRequest::AlterConsumerGroupOffsets(requests), options, fan_out);

        Ok(handles)
    }

    pub fn describe_topics(
        &self,
        topics: &[&str],
        options: &AdminOptions,
    ) -> Result<HandleMap<String, TopicDescription>, ValidationError> {
        let operation = AdminOperation::DescribeTopics;
        options.validate_for(operation)?;
        let topics = names(topics, "topic")?;

        let (handles, fan_out) = fan_out::ordered(operation, topics.clone());
        self.dispatch(AdminRequest::DescribeTopics(topics), options, fan_out);

        Ok(handles)
    }

    pub fn describe_cluster(
        &self,
        options: &AdminOptions,
    ) -> Result<CompletionHandle<DescribeClusterResult>, ValidationError> {
        let operation = AdminOperation::DescribeCluster;
        options.validate_for(operation)?;

        let (handle, fan_out) = fan_out::single(operation);
        self.dispatch(AdminRequest::DescribeCluster, options, fan_out);

        Ok(handle)
    }

    /// Describes the SCRAM credentials of the given users.
    pub fn describe_user_scram_credentials(
        &self,
        users: &[&str],
        options: &AdminOptions,
    ) -> Result<HandleMap<String, UserScramCredentialsDescription>, ValidationError> {
        let operation = AdminOperation::DescribeUserScramCredentials;
        options.validate_for(operation)?;
        let users = names(users, "user")?;

        let (handles, fan_out) = fan_out::keyed(operation, users.clone());
        self.dispatch(AdminRequest::DescribeUserScramCredentials(Some(users)), options, fan_out);

        Ok(handles)
    }

    /// Describes the SCRAM credentials of every user.
    ///
    /// The single handle fails if describing any of the users fails.
    pub fn describe_all_user_scram_credentials(
        &self,
        options: &AdminOptions,
    ) -> Result<CompletionHandle<HashMap<String, UserScramCredentialsDescription>>, ValidationError> {
        let operation = AdminOperation::DescribeUserScramCredentials;
        options.validate_for(operation)?;

        let (handle, fan_out) =
            fan_out::single_with(operation, fan_out::all_by_name::<UserScramCredentialsDescription>);
        self.dispatch(AdminRequest::DescribeUserScramCredentials(None), options, fan_out);

        Ok(handle)
    }

    /// Upserts and deletes user SCRAM credentials.
    ///
    /// Handles are keyed by user: alterations of the same user share its handle.
    /// A user can't be altered twice for the same mechanism in one request.
    pub fn alter_user_scram_credentials(
        &self,
        alterations: Vec<UserScramCredentialAlteration>,
        options: &AdminOptions,
    ) -> Result<HandleMap<String, ()>, ValidationError> {
        let operation = AdminOperation::AlterUserScramCredentials;
        options.validate_for(operation)?;

        require_at_least_one(&alterations, "alteration")?;
        alterations.iter().try_for_each(UserScramCredentialAlteration::validate)?;
        let user_mechanisms: Vec<(&str, ScramMechanism)> =
            alterations.iter().map(|a| (a.user(), a.mechanism())).collect();
        require_unique_by(
            &user_mechanisms,
            "user SCRAM mechanism",
            |(user, mechanism): &(&str, ScramMechanism)| format!("{user}/{mechanism}"),
        )?;

        let mut users: Vec<String> = Vec::new();
        for alteration in &alterations {
            if !users.iter().any(|u| u == alteration.user()) {
                users.push(alteration.user().to_string());
            }
        }

        let (handles, fan_out) = fan_out::keyed(operation, users);
        self.dispatch(AdminRequest::AlterUserScramCredentials(alterations), options, fan_out);

        Ok(handles)
    }

    /// Looks up offsets of partitions: earliest, latest, or by timestamp.
    ///
    /// Supports the `isolation_level` option.
    pub fn list_offsets(
        &self,
        partitions: Vec<(TopicPartition, OffsetSpec)>,
        options: &AdminOptions,
    ) -> Result<HandleMap<TopicPartition, ListOffsetsResultInfo>, ValidationError> {
        let operation = AdminOperation::ListOffsets;
        options.validate_for(operation)?;

        require_at_least_one(&partitions, "topic partition")?;
        for (tp, spec) in &partitions {
            tp.validate()?;
            spec.validate()?;
        }
        let keys: Vec<TopicPartition> = partitions.iter().map(|(tp, _)| tp.clone()).collect();
        require_unique(&keys, "topic partition")?;

        let (handles, fan_out) = fan_out::keyed(operation, keys);
        self.dispatch(AdminRequest::ListOffsets(partitions), options, fan_out);

        Ok(handles)
    }

    /// Deletes the records of partitions before the given offsets.
    ///
    /// An offset of [`OFFSET_END`] deletes every record of the partition.
    ///
    /// [`OFFSET_END`]: crate::OFFSET_END
    pub fn delete_records(
        &self,
        before_offsets: Vec<TopicPartitionOffset>,
        options: &AdminOptions,
    ) -> Result<HandleMap<TopicPartition, DeletedRecords>, ValidationError> {
        let operation = AdminOperation::DeleteRecords;
        options.validate_for(operation)?;

        require_at_least_one(&before_offsets, "topic partition")?;
        for tpo in &before_offsets {
            tpo.topic_partition().validate()?;
            if tpo.offset != OFFSET_END {
                require_non_negative(tpo.offset, "offset")?;
            }
        }
        let keys: Vec<TopicPartition> = before_offsets.iter().map(TopicPartitionOffset::topic_partition).collect();
        require_unique(&keys, "topic partition")?;

        let (handles, fan_out) = fan_out::keyed(operation, keys);
        self.dispatch(AdminRequest::DeleteRecords(before_offsets), options, fan_out);

        Ok(handles)
    }

    /// Elects partition leaders.
    ///
    /// With `None` partitions, elects leaders for every partition of the cluster.
    /// The handle resolves with the outcome of each election: `None` when the election succeeded.
    pub fn elect_leaders(
        &self,
        election_type: ElectionType,
        partitions: Option<Vec<TopicPartition>>,
        options: &AdminOptions,
    ) -> Result<CompletionHandle<HashMap<TopicPartition, Option<KafkaError>>>, ValidationError> {
        let operation = AdminOperation::ElectLeaders;
        options.validate_for(operation)?;

        if let Some(partitions) = &partitions {
            require_at_least_one(partitions, "topic partition")?;
            partitions.iter().try_for_each(TopicPartition::validate)?;
            require_unique(partitions, "topic partition")?;
        }

        let (handle, fan_out) = fan_out::single(operation);
        self.dispatch(
            AdminRequest::ElectLeaders {
                election_type,
                partitions,
            },
            options,
            fan_out,
        );

        Ok(handle)
    }
}

/// Validates a non-empty list of unique names (topics, groups, users).
fn names(items: &[&str], field: &'static str) -> Result<Vec<String>, ValidationError> {
    require_at_least_one(items, field)?;
    items.iter().try_for_each(|item| require_non_empty(item, field))?;

    let names: Vec<String> = items.iter().map(|item| item.to_string()).collect();
    require_unique(&names, field)?;

    Ok(names)
}

fn validate_resources(
    resources: &[ConfigResource],
    validate: fn(&ConfigResource) -> Result<(), ValidationError>,
) -> Result<(), ValidationError> {
    require_at_least_one(resources, "config resource")?;
    resources.iter().try_for_each(validate)?;
    require_unique(resources, "config resource")?;
    require_single_broker(resources)
}

fn require_single_group(
    operation: AdminOperation,
    requests: &[ConsumerGroupTopicPartitions],
) -> Result<(), ValidationError> {
    if requests.len() != 1 {
        return Err(ValidationError::SingleGroupOnly(operation, requests.len()));
    }

    Ok(())
}
