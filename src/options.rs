use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::ValidationError;
use crate::group::{ConsumerGroupState, ConsumerGroupType};
use crate::offsets::IsolationLevel;

/// The admin verbs this crate dispatches.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum AdminOperation {
    CreateTopics,
    DeleteTopics,
    CreatePartitions,
    DescribeConfigs,
    AlterConfigs,
    IncrementalAlterConfigs,
    CreateAcls,
    DescribeAcls,
    DeleteAcls,
    ListConsumerGroups,
    DescribeConsumerGroups,
    DeleteConsumerGroups,
    ListConsumerGroupOffsets,
    AlterConsumerGroupOffsets,
    DescribeTopics,
    DescribeCluster,
    DescribeUserScramCredentials,
    AlterUserScramCredentials,
    ListOffsets,
    DeleteRecords,
    ElectLeaders,
}

impl AdminOperation {
    pub fn name(&self) -> &'static str {
        match self {
            AdminOperation::CreateTopics => "create_topics",
            AdminOperation::DeleteTopics => "delete_topics",
            AdminOperation::CreatePartitions => "create_partitions",
            AdminOperation::DescribeConfigs => "describe_configs",
            AdminOperation::AlterConfigs => "alter_configs",
            AdminOperation::IncrementalAlterConfigs => "incremental_alter_configs",
            AdminOperation::CreateAcls => "create_acls",
            AdminOperation::DescribeAcls => "describe_acls",
            AdminOperation::DeleteAcls => "delete_acls",
            AdminOperation::ListConsumerGroups => "list_consumer_groups",
            AdminOperation::DescribeConsumerGroups => "describe_consumer_groups",
            AdminOperation::DeleteConsumerGroups => "delete_consumer_groups",
            AdminOperation::ListConsumerGroupOffsets => "list_consumer_group_offsets",
            AdminOperation::AlterConsumerGroupOffsets => "alter_consumer_group_offsets",
            AdminOperation::DescribeTopics => "describe_topics",
            AdminOperation::DescribeCluster => "describe_cluster",
            AdminOperation::DescribeUserScramCredentials => "describe_user_scram_credentials",
            AdminOperation::AlterUserScramCredentials => "alter_user_scram_credentials",
            AdminOperation::ListOffsets => "list_offsets",
            AdminOperation::DeleteRecords => "delete_records",
            AdminOperation::ElectLeaders => "elect_leaders",
        }
    }

    fn supports_operation_timeout(&self) -> bool {
        matches!(
            self,
            AdminOperation::CreateTopics
                | AdminOperation::DeleteTopics
                | AdminOperation::CreatePartitions
                | AdminOperation::DeleteRecords
                | AdminOperation::ElectLeaders
        )
    }

    fn supports_validate_only(&self) -> bool {
        matches!(
            self,
            AdminOperation::CreateTopics
                | AdminOperation::CreatePartitions
                | AdminOperation::AlterConfigs
                | AdminOperation::IncrementalAlterConfigs
        )
    }

    fn supports_broker(&self) -> bool {
        matches!(
            self,
            AdminOperation::DescribeConfigs | AdminOperation::AlterConfigs | AdminOperation::IncrementalAlterConfigs
        )
    }

    fn supports_include_authorized_operations(&self) -> bool {
        matches!(
            self,
            AdminOperation::DescribeConsumerGroups | AdminOperation::DescribeTopics | AdminOperation::DescribeCluster
        )
    }
}

impl fmt::Display for AdminOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const OPT_REQUEST_TIMEOUT: &str = "request_timeout";
const OPT_OPERATION_TIMEOUT: &str = "operation_timeout";
const OPT_VALIDATE_ONLY: &str = "validate_only";
const OPT_BROKER: &str = "broker";
const OPT_ISOLATION_LEVEL: &str = "isolation_level";
const OPT_REQUIRE_STABLE: &str = "require_stable";
const OPT_INCLUDE_AUTHORIZED_OPERATIONS: &str = "include_authorized_operations";
const OPT_STATES: &str = "states";
const OPT_TYPES: &str = "types";

/// Options for an admin request.
///
/// Every option is unset by default, leaving the choice to the native client
/// (usually driven by its own configuration, e.g. `socket.timeout.ms`).
///
/// Not every option makes sense for every [`AdminOperation`]: setting one on a verb that
/// does not support it is a [`ValidationError::UnsupportedOption`], reported before dispatch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminOptions {
    request_timeout: Option<Duration>,
    operation_timeout: Option<Duration>,
    validate_only: Option<bool>,
    broker_id: Option<i32>,
    isolation_level: Option<IsolationLevel>,
    require_stable_offsets: Option<bool>,
    include_authorized_operations: Option<bool>,
    match_consumer_group_states: Option<Vec<ConsumerGroupState>>,
    match_consumer_group_types: Option<Vec<ConsumerGroupType>>,
}

impl AdminOptions {
    pub fn new() -> AdminOptions {
        AdminOptions::default()
    }

    /// Parses options from `(key, value)` string pairs.
    ///
    /// Recognized keys: `request_timeout` and `operation_timeout` (seconds, fractional allowed),
    /// `validate_only`, `require_stable` and `include_authorized_operations` (booleans),
    /// `broker` (broker id), `isolation_level` (`read_uncommitted` or `read_committed`),
    /// `states` and `types` (comma-separated consumer group states/types).
    ///
    /// Unknown keys and values that do not parse are rejected.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<AdminOptions, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = AdminOptions::default();

        for (key, value) in pairs {
            let (key, value) = (key.as_ref().trim(), value.as_ref().trim());
            match key {
                OPT_REQUEST_TIMEOUT => options.request_timeout = Some(parse_timeout(key, value)?),
                OPT_OPERATION_TIMEOUT => options.operation_timeout = Some(parse_timeout(key, value)?),
                OPT_VALIDATE_ONLY => options.validate_only = Some(parse_option(key, value)?),
                OPT_REQUIRE_STABLE => options.require_stable_offsets = Some(parse_option(key, value)?),
                OPT_INCLUDE_AUTHORIZED_OPERATIONS => {
                    options.include_authorized_operations = Some(parse_option(key, value)?)
                },
                OPT_BROKER => {
                    let broker_id: i32 = parse_option(key, value)?;
                    if broker_id < 0 {
                        return Err(invalid_value(key, value));
                    }
                    options.broker_id = Some(broker_id);
                },
                OPT_ISOLATION_LEVEL => options.isolation_level = Some(parse_option(key, value)?),
                OPT_STATES => options.match_consumer_group_states = Some(parse_list(key, value)?),
                OPT_TYPES => options.match_consumer_group_types = Some(parse_list(key, value)?),
                unknown => return Err(ValidationError::UnrecognizedOption(unknown.to_string())),
            }
        }

        Ok(options)
    }

    /// Overall request timeout, including broker lookup, request transmission,
    /// operation time on broker, and response.
    pub fn request_timeout<T: Into<Duration>>(mut self, timeout: Option<T>) -> Self {
        self.request_timeout = timeout.map(Into::into);
        self
    }

    /// How long the broker waits for the operation to propagate in the cluster
    /// before responding. A zero duration returns immediately.
    pub fn operation_timeout<T: Into<Duration>>(mut self, timeout: Option<T>) -> Self {
        self.operation_timeout = timeout.map(Into::into);
        self
    }

    /// Tells the broker to only validate the request, without performing it.
    pub fn validate_only(mut self, validate_only: bool) -> Self {
        self.validate_only = Some(validate_only);
        self
    }

    /// Overrides what broker the request is sent to.
    pub fn broker_id<T: Into<Option<i32>>>(mut self, broker_id: T) -> Self {
        self.broker_id = broker_id.into();
        self
    }

    pub fn isolation_level(mut self, isolation_level: IsolationLevel) -> Self {
        self.isolation_level = Some(isolation_level);
        self
    }

    /// Only return stable offsets (i.e. not part of an ongoing transaction).
    pub fn require_stable_offsets(mut self, require_stable: bool) -> Self {
        self.require_stable_offsets = Some(require_stable);
        self
    }

    pub fn include_authorized_operations(mut self, include: bool) -> Self {
        self.include_authorized_operations = Some(include);
        self
    }

    /// Only list consumer groups in one of these states.
    pub fn match_consumer_group_states<I: IntoIterator<Item = ConsumerGroupState>>(mut self, states: I) -> Self {
        self.match_consumer_group_states = Some(dedup(states));
        self
    }

    /// Only list consumer groups of one of these types.
    pub fn match_consumer_group_types<I: IntoIterator<Item = ConsumerGroupType>>(mut self, types: I) -> Self {
        self.match_consumer_group_types = Some(dedup(types));
        self
    }

    pub fn get_request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    pub fn get_operation_timeout(&self) -> Option<Duration> {
        self.operation_timeout
    }

    pub fn is_validate_only(&self) -> bool {
        self.validate_only.unwrap_or(false)
    }

    pub fn get_broker_id(&self) -> Option<i32> {
        self.broker_id
    }

    pub fn get_isolation_level(&self) -> Option<IsolationLevel> {
        self.isolation_level
    }

    pub fn is_require_stable_offsets(&self) -> bool {
        self.require_stable_offsets.unwrap_or(false)
    }

    pub fn is_include_authorized_operations(&self) -> bool {
        self.include_authorized_operations.unwrap_or(false)
    }

    pub fn get_match_consumer_group_states(&self) -> Option<&[ConsumerGroupState]> {
        self.match_consumer_group_states.as_deref()
    }

    pub fn get_match_consumer_group_types(&self) -> Option<&[ConsumerGroupType]> {
        self.match_consumer_group_types.as_deref()
    }

    /// Checks that every option that is set is supported by `operation`, and has a valid value.
    pub(crate) fn validate_for(&self, operation: AdminOperation) -> Result<(), ValidationError> {
        let unsupported = |option| Err(ValidationError::UnsupportedOption { option, operation });

        if self.operation_timeout.is_some() && !operation.supports_operation_timeout() {
            return unsupported(OPT_OPERATION_TIMEOUT);
        }
        if self.validate_only.is_some() && !operation.supports_validate_only() {
            return unsupported(OPT_VALIDATE_ONLY);
        }
        if let Some(broker_id) = self.broker_id {
            if !operation.supports_broker() {
                return unsupported(OPT_BROKER);
            }
            if broker_id < 0 {
                return Err(invalid_value(OPT_BROKER, &broker_id.to_string()));
            }
        }
        if self.isolation_level.is_some() && operation != AdminOperation::ListOffsets {
            return unsupported(OPT_ISOLATION_LEVEL);
        }
        if self.require_stable_offsets.is_some() && operation != AdminOperation::ListConsumerGroupOffsets {
            return unsupported(OPT_REQUIRE_STABLE);
        }
        if self.include_authorized_operations.is_some() && !operation.supports_include_authorized_operations() {
            return unsupported(OPT_INCLUDE_AUTHORIZED_OPERATIONS);
        }
        if self.match_consumer_group_states.is_some() && operation != AdminOperation::ListConsumerGroups {
            return unsupported(OPT_STATES);
        }
        if self.match_consumer_group_types.is_some() && operation != AdminOperation::ListConsumerGroups {
            return unsupported(OPT_TYPES);
        }

        Ok(())
    }
}

fn invalid_value(key: &str, value: &str) -> ValidationError {
    ValidationError::InvalidOptionValue {
        option: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_option<T: FromStr>(key: &str, value: &str) -> Result<T, ValidationError> {
    value.parse().map_err(|_| invalid_value(key, value))
}

fn parse_timeout(key: &str, value: &str) -> Result<Duration, ValidationError> {
    let secs: f64 = parse_option(key, value)?;
    Duration::try_from_secs_f64(secs).map_err(|_| invalid_value(key, value))
}

fn parse_list<T: FromStr + PartialEq>(key: &str, value: &str) -> Result<Vec<T>, ValidationError> {
    let items = value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| parse_option(key, item))
        .collect::<Result<Vec<T>, _>>()?;

    Ok(dedup(items))
}

fn dedup<T: PartialEq, I: IntoIterator<Item = T>>(items: I) -> Vec<T> {
    let mut out = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
