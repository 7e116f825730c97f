use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::errors::ValidationError;
use crate::utils::{require_non_empty, wire_enum};

wire_enum! {
    /// Type of a Kafka resource.
    pub enum ResourceType {
        Unknown = 0 => "UNKNOWN",
        /// Matches any resource type: only valid in filters.
        Any = 1 => "ANY",
        Topic = 2 => "TOPIC",
        Group = 3 => "GROUP",
        Broker = 4 => "BROKER",
        TransactionalId = 5 => "TRANSACTIONAL_ID",
    }
}

wire_enum! {
    /// Where the value of a configuration entry comes from.
    pub enum ConfigSource {
        Unknown = 0 => "UNKNOWN_CONFIG",
        DynamicTopic = 1 => "DYNAMIC_TOPIC_CONFIG",
        DynamicBroker = 2 => "DYNAMIC_BROKER_CONFIG",
        DynamicDefaultBroker = 3 => "DYNAMIC_DEFAULT_BROKER_CONFIG",
        StaticBroker = 4 => "STATIC_BROKER_CONFIG",
        Default = 5 => "DEFAULT_CONFIG",
    }
}

wire_enum! {
    /// How an incremental alter configs entry changes the current value.
    pub enum AlterConfigOpType {
        /// Set the value.
        Set = 0 => "SET",
        /// Revert to the default value.
        Delete = 1 => "DELETE",
        /// Append to a list value.
        Append = 2 => "APPEND",
        /// Remove from a list value.
        Subtract = 3 => "SUBTRACT",
    }
}

/// A configuration entry (a.k.a. property) of a resource.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfigEntry {
    pub name: String,

    /// Value, if any. Sensitive values are never returned by brokers.
    pub value: Option<String>,

    pub source: ConfigSource,
    pub is_read_only: bool,
    pub is_default: bool,
    pub is_sensitive: bool,
    pub is_synonym: bool,

    /// Entries of other sources that could set this same entry, in precedence order.
    pub synonyms: Vec<ConfigEntry>,

    /// Only used in incremental alter configs requests.
    pub incremental_operation: Option<AlterConfigOpType>,
}

impl ConfigEntry {
    /// An entry for an incremental alter configs request.
    pub fn incremental<N: Into<String>>(name: N, value: Option<String>, operation: AlterConfigOpType) -> Self {
        Self {
            name: name.into(),
            value,
            source: ConfigSource::Unknown,
            is_read_only: false,
            is_default: false,
            is_sensitive: false,
            is_synonym: false,
            synonyms: Vec::new(),
            incremental_operation: Some(operation),
        }
    }

    fn validate_incremental(&self) -> Result<(), ValidationError> {
        const ENTITY: &str = "ConfigEntry";

        require_non_empty(&self.name, "name")?;
        match self.incremental_operation {
            None => Err(ValidationError::MissingField {
                entity: ENTITY,
                field: "incremental_operation",
            }),
            Some(AlterConfigOpType::Delete) => Ok(()),
            Some(_) if self.value.is_none() => Err(ValidationError::MissingField {
                entity: ENTITY,
                field: "value",
            }),
            Some(_) => Ok(()),
        }
    }
}

/// Configuration entries of a resource, by name.
pub type ConfigEntries = BTreeMap<String, ConfigEntry>;

/// A resource (topic, broker, ...) whose configuration is described or altered.
///
/// Identity is given by [`Self::restype`] and [`Self::name`] only: two resources
/// with the same type and name are the same resource, whatever the configuration they carry.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfigResource {
    pub restype: ResourceType,
    pub name: String,

    /// Values to set, for alter configs requests.
    pub set_config: BTreeMap<String, String>,

    /// Entries to apply, for incremental alter configs requests.
    pub incremental_configs: Vec<ConfigEntry>,
}

impl ConfigResource {
    pub fn new<N: Into<String>>(restype: ResourceType, name: N) -> Self {
        Self {
            restype,
            name: name.into(),
            set_config: BTreeMap::new(),
            incremental_configs: Vec::new(),
        }
    }

    /// Sets a configuration value, for alter configs requests.
    pub fn set_config<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.set_config.insert(key.into(), value.into());
        self
    }

    /// Adds an incremental entry, for incremental alter configs requests.
    pub fn add_incremental_config(mut self, entry: ConfigEntry) -> Self {
        self.incremental_configs.push(entry);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        if matches!(self.restype, ResourceType::Unknown | ResourceType::Any) {
            return Err(ValidationError::ValueNotAllowed {
                entity: "ConfigResource",
                field: "restype",
                value: self.restype.to_string(),
            });
        }

        require_non_empty(&self.name, "name")
    }

    pub(crate) fn validate_incremental(&self) -> Result<(), ValidationError> {
        self.validate()?;
        if self.incremental_configs.is_empty() {
            return Err(ValidationError::EmptyCollection("incremental config entry"));
        }

        self.incremental_configs.iter().try_for_each(ConfigEntry::validate_incremental)
    }
}

impl PartialEq for ConfigResource {
    fn eq(&self, other: &Self) -> bool {
        self.restype == other.restype && self.name == other.name
    }
}

impl Eq for ConfigResource {}

impl Hash for ConfigResource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.restype.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Display for ConfigResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigResource({},{})", self.restype, self.name)
    }
}

/// Fails if more than one of `resources` is a broker: broker resources have
/// to be sent to that broker, so a request can only target one.
pub(crate) fn require_single_broker(resources: &[ConfigResource]) -> Result<(), ValidationError> {
    let brokers = resources.iter().filter(|r| r.restype == ResourceType::Broker).count();
    if brokers > 1 {
        return Err(ValidationError::TooManyBrokerResources(ResourceType::Broker.name()));
    }

    Ok(())
}
