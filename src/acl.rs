use std::fmt;

use crate::config::ResourceType;
use crate::errors::ValidationError;
use crate::utils::{require_non_empty, wire_enum};

wire_enum! {
    /// Operation an ACL grants or denies.
    pub enum AclOperation {
        Unknown = 0 => "UNKNOWN",
        /// Matches any operation: only valid in filters.
        Any = 1 => "ANY",
        All = 2 => "ALL",
        Read = 3 => "READ",
        Write = 4 => "WRITE",
        Create = 5 => "CREATE",
        Delete = 6 => "DELETE",
        Alter = 7 => "ALTER",
        Describe = 8 => "DESCRIBE",
        ClusterAction = 9 => "CLUSTER_ACTION",
        DescribeConfigs = 10 => "DESCRIBE_CONFIGS",
        AlterConfigs = 11 => "ALTER_CONFIGS",
        IdempotentWrite = 12 => "IDEMPOTENT_WRITE",
    }
}

wire_enum! {
    /// Whether an ACL grants or denies its operation.
    pub enum AclPermissionType {
        Unknown = 0 => "UNKNOWN",
        /// Matches any permission type: only valid in filters.
        Any = 1 => "ANY",
        Deny = 2 => "DENY",
        Allow = 3 => "ALLOW",
    }
}

wire_enum! {
    /// How the resource name of an ACL is interpreted.
    pub enum ResourcePatternType {
        Unknown = 0 => "UNKNOWN",
        /// Matches any pattern type: only valid in filters.
        Any = 1 => "ANY",
        /// Matches literal, wildcard and prefixed bindings that apply to the name: only valid in filters.
        Match = 2 => "MATCH",
        /// The name is the exact resource name (or the `*` wildcard).
        Literal = 3 => "LITERAL",
        /// The name is a prefix of resource names.
        Prefixed = 4 => "PREFIXED",
    }
}

/// An Access Control List entry: binds a principal, from a host, to an operation on a resource.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AclBinding {
    pub restype: ResourceType,
    pub name: String,
    pub resource_pattern_type: ResourcePatternType,

    /// The principal, e.g. `User:alice`.
    pub principal: String,

    /// The host, or `*` for any host.
    pub host: String,

    pub operation: AclOperation,
    pub permission_type: AclPermissionType,
}

impl AclBinding {
    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        const ENTITY: &str = "AclBinding";

        if matches!(self.restype, ResourceType::Unknown | ResourceType::Any) {
            return Err(not_allowed(ENTITY, "restype", self.restype));
        }
        if matches!(
            self.resource_pattern_type,
            ResourcePatternType::Unknown | ResourcePatternType::Any | ResourcePatternType::Match
        ) {
            return Err(not_allowed(ENTITY, "resource_pattern_type", self.resource_pattern_type));
        }
        if matches!(self.operation, AclOperation::Unknown | AclOperation::Any) {
            return Err(not_allowed(ENTITY, "operation", self.operation));
        }
        if matches!(self.permission_type, AclPermissionType::Unknown | AclPermissionType::Any) {
            return Err(not_allowed(ENTITY, "permission_type", self.permission_type));
        }

        require_non_empty(&self.name, "name")?;
        require_non_empty(&self.principal, "principal")?;
        require_non_empty(&self.host, "host")
    }
}

impl fmt::Display for AclBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AclBinding({},{},{},{},{},{},{})",
            self.restype,
            self.name,
            self.resource_pattern_type,
            self.principal,
            self.host,
            self.operation,
            self.permission_type
        )
    }
}

/// A filter matching [`AclBinding`]s.
///
/// Absent strings match any value, as do the `Any` enum values;
/// [`ResourcePatternType::Match`] also matches wildcard and prefixed bindings.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AclBindingFilter {
    pub restype: ResourceType,
    pub name: Option<String>,
    pub resource_pattern_type: ResourcePatternType,
    pub principal: Option<String>,
    pub host: Option<String>,
    pub operation: AclOperation,
    pub permission_type: AclPermissionType,
}

impl AclBindingFilter {
    /// A filter that matches every binding.
    pub fn any() -> Self {
        Self {
            restype: ResourceType::Any,
            name: None,
            resource_pattern_type: ResourcePatternType::Any,
            principal: None,
            host: None,
            operation: AclOperation::Any,
            permission_type: AclPermissionType::Any,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        const ENTITY: &str = "AclBindingFilter";

        if self.restype == ResourceType::Unknown {
            return Err(not_allowed(ENTITY, "restype", self.restype));
        }
        if self.resource_pattern_type == ResourcePatternType::Unknown {
            return Err(not_allowed(ENTITY, "resource_pattern_type", self.resource_pattern_type));
        }
        if self.operation == AclOperation::Unknown {
            return Err(not_allowed(ENTITY, "operation", self.operation));
        }
        if self.permission_type == AclPermissionType::Unknown {
            return Err(not_allowed(ENTITY, "permission_type", self.permission_type));
        }

        Ok(())
    }
}

impl fmt::Display for AclBindingFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let or_any = |s: &Option<String>| s.clone().unwrap_or_else(|| "*".to_string());
        write!(
            f,
            "AclBindingFilter({},{},{},{},{},{},{})",
            self.restype,
            or_any(&self.name),
            self.resource_pattern_type,
            or_any(&self.principal),
            or_any(&self.host),
            self.operation,
            self.permission_type
        )
    }
}

impl From<AclBinding> for AclBindingFilter {
    fn from(binding: AclBinding) -> Self {
        Self {
            restype: binding.restype,
            name: Some(binding.name),
            resource_pattern_type: binding.resource_pattern_type,
            principal: Some(binding.principal),
            host: Some(binding.host),
            operation: binding.operation,
            permission_type: binding.permission_type,
        }
    }
}

fn not_allowed<V: fmt::Display>(entity: &'static str, field: &'static str, value: V) -> ValidationError {
    ValidationError::ValueNotAllowed {
        entity,
        field,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::testing::acl_binding;
    use crate::utils::is_thread_safe;

    fn binding() -> AclBinding {
        acl_binding("User:alice")
    }

    #[test]
    fn valid_binding() {
        assert!(binding().validate().is_ok());
    }

    #[rstest]
    #[case(AclBinding { restype: ResourceType::Any, ..binding() }, "restype")]
    #[case(AclBinding { restype: ResourceType::Unknown, ..binding() }, "restype")]
    #[case(AclBinding { resource_pattern_type: ResourcePatternType::Match, ..binding() }, "resource_pattern_type")]
    #[case(AclBinding { resource_pattern_type: ResourcePatternType::Any, ..binding() }, "resource_pattern_type")]
    #[case(AclBinding { operation: AclOperation::Any, ..binding() }, "operation")]
    #[case(AclBinding { permission_type: AclPermissionType::Any, ..binding() }, "permission_type")]
    fn binding_rejects_wildcards(#[case] binding: AclBinding, #[case] field: &str) {
        match binding.validate() {
            Err(ValidationError::ValueNotAllowed { field: f, .. }) => assert_eq!(f, field),
            other => panic!("Unexpected validation result: {other:?}"),
        }
    }

    #[test]
    fn binding_requires_principal() {
        let b = AclBinding {
            principal: String::new(),
            ..binding()
        };
        assert_eq!(b.validate(), Err(ValidationError::EmptyField("principal")));
    }

    #[test]
    fn filter_accepts_wildcards_but_not_unknown() {
        assert!(AclBindingFilter::any().validate().is_ok());

        let f = AclBindingFilter {
            resource_pattern_type: ResourcePatternType::Match,
            ..AclBindingFilter::from(binding())
        };
        assert!(f.validate().is_ok());

        let f = AclBindingFilter {
            operation: AclOperation::Unknown,
            ..AclBindingFilter::any()
        };
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_types_thread_safety() {
        is_thread_safe::<AclBinding>();
        is_thread_safe::<AclBindingFilter>();
    }
}
