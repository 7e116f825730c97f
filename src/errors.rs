use std::fmt;

use thiserror::Error;

use crate::options::AdminOperation;

/// Errors detected while validating an admin request, before anything is dispatched.
///
/// These are always returned synchronously by the [`AdminClient`] methods:
/// they never reach a [`CompletionHandle`].
///
/// [`AdminClient`]: crate::AdminClient
/// [`CompletionHandle`]: crate::CompletionHandle
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ValidationError {
    #[error("'{0}' cannot be empty")]
    EmptyField(&'static str),

    #[error("Expected at least one {0}")]
    EmptyCollection(&'static str),

    #[error("'{field}' must not be negative, got {value}")]
    NegativeValue { field: &'static str, value: i64 },

    #[error("'{field}' must be positive, got {value}")]
    NonPositiveValue { field: &'static str, value: i64 },

    #[error("Duplicate {entity} not allowed: {key}")]
    Duplicate { entity: &'static str, key: String },

    #[error("Currently {0} supports a single consumer group only, got {1}")]
    SingleGroupOnly(AdminOperation, usize),

    #[error("'{field}' cannot be {value} in {entity}")]
    ValueNotAllowed {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("'{field}' must not be set in {entity}")]
    FieldNotAllowed { entity: &'static str, field: &'static str },

    #[error("'{field}' is required in {entity}")]
    MissingField { entity: &'static str, field: &'static str },

    #[error("At most one {0} resource is allowed per request")]
    TooManyBrokerResources(&'static str),

    #[error("Replica assignment for topic '{topic}' has {assigned} partition(s), expected {expected}")]
    ReplicaAssignmentMismatch { topic: String, assigned: usize, expected: i32 },

    #[error("Unrecognized admin option '{0}'")]
    UnrecognizedOption(String),

    #[error("Invalid value '{value}' for admin option '{option}'")]
    InvalidOptionValue { option: String, value: String },

    #[error("Admin option '{option}' is not supported by {operation}")]
    UnsupportedOption { option: &'static str, operation: AdminOperation },
}

/// Error codes reported by the native client or by the brokers.
///
/// Negative codes are client-side (local) errors, positive codes are the ones defined
/// by the [Kafka protocol]. Codes this crate has no variant for are kept in [`ErrorCode::Other`].
///
/// [Kafka protocol]: https://kafka.apache.org/protocol#protocol_error_codes
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorCode {
    /// Broker transport failure (`-195`).
    Transport,
    /// Operation timed out (`-185`).
    TimedOut,
    /// Invalid argument or configuration (`-186`).
    InvalidArgument,
    /// Client instance is being destroyed (`-197`).
    Destroy,
    /// Generic failure (`-196`).
    Fail,
    UnknownTopicOrPartition,
    NotController,
    TopicAlreadyExists,
    InvalidPartitions,
    InvalidReplicationFactor,
    PolicyViolation,
    TopicAuthorizationFailed,
    GroupAuthorizationFailed,
    ClusterAuthorizationFailed,
    GroupIdNotFound,
    NonEmptyGroup,
    SecurityDisabled,
    ResourceNotFound,
    Other(i32),
}

impl ErrorCode {
    /// Wire-level integer for this code.
    pub fn code(&self) -> i32 {
        match self {
            ErrorCode::Transport => -195,
            ErrorCode::TimedOut => -185,
            ErrorCode::InvalidArgument => -186,
            ErrorCode::Destroy => -197,
            ErrorCode::Fail => -196,
            ErrorCode::UnknownTopicOrPartition => 3,
            ErrorCode::NotController => 41,
            ErrorCode::TopicAlreadyExists => 36,
            ErrorCode::InvalidPartitions => 37,
            ErrorCode::InvalidReplicationFactor => 38,
            ErrorCode::PolicyViolation => 44,
            ErrorCode::TopicAuthorizationFailed => 29,
            ErrorCode::GroupAuthorizationFailed => 30,
            ErrorCode::ClusterAuthorizationFailed => 31,
            ErrorCode::GroupIdNotFound => 69,
            ErrorCode::NonEmptyGroup => 68,
            ErrorCode::SecurityDisabled => 54,
            ErrorCode::ResourceNotFound => 91,
            ErrorCode::Other(code) => *code,
        }
    }
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        match code {
            -195 => ErrorCode::Transport,
            -185 => ErrorCode::TimedOut,
            -186 => ErrorCode::InvalidArgument,
            -197 => ErrorCode::Destroy,
            -196 => ErrorCode::Fail,
            3 => ErrorCode::UnknownTopicOrPartition,
            41 => ErrorCode::NotController,
            36 => ErrorCode::TopicAlreadyExists,
            37 => ErrorCode::InvalidPartitions,
            38 => ErrorCode::InvalidReplicationFactor,
            44 => ErrorCode::PolicyViolation,
            29 => ErrorCode::TopicAuthorizationFailed,
            30 => ErrorCode::GroupAuthorizationFailed,
            31 => ErrorCode::ClusterAuthorizationFailed,
            69 => ErrorCode::GroupIdNotFound,
            68 => ErrorCode::NonEmptyGroup,
            54 => ErrorCode::SecurityDisabled,
            91 => ErrorCode::ResourceNotFound,
            other => ErrorCode::Other(other),
        }
    }
}

impl From<ErrorCode> for i32 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Other(code) => write!(f, "Other({code})"),
            named => write!(f, "{named:?}({})", named.code()),
        }
    }
}

/// An error as reported by the native client: either for a whole request, or for one entity of it.
#[derive(Error, Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("{code}: {message}")]
pub struct KafkaError {
    pub code: ErrorCode,
    pub message: String,
}

impl KafkaError {
    pub fn new<C: Into<ErrorCode>, M: Into<String>>(code: C, message: M) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// What went wrong for an [`AdminError`] delivered through a handle.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum AdminErrorKind {
    /// The whole native call failed before producing per-entity results:
    /// every handle of the request carries the same error.
    Request,

    /// The native call succeeded, but this specific entity failed.
    Entity,

    /// The native client returned results that do not fit the request
    /// (wrong count, unknown key, unexpected payload). This is a defect, not a broker error.
    InternalContract,

    /// The request was dropped before it was ever resolved.
    Canceled,
}

impl fmt::Display for AdminErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AdminErrorKind::Request => "request failed",
            AdminErrorKind::Entity => "entity failed",
            AdminErrorKind::InternalContract => "internal contract violation",
            AdminErrorKind::Canceled => "canceled",
        };
        f.write_str(s)
    }
}

/// The error a [`CompletionHandle`] resolves with.
///
/// A single value, tagged by [`AdminErrorKind`], optionally wrapping the [`KafkaError`]
/// that caused it: match on [`AdminError::kind`] to tell request-level, per-entity
/// and internal failures apart.
///
/// [`CompletionHandle`]: crate::CompletionHandle
#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[error("{kind}: {message}")]
pub struct AdminError {
    kind: AdminErrorKind,
    message: String,
    #[source]
    cause: Option<KafkaError>,
}

impl AdminError {
    pub(crate) fn request(cause: KafkaError) -> Self {
        Self {
            kind: AdminErrorKind::Request,
            message: cause.to_string(),
            cause: Some(cause),
        }
    }

    pub(crate) fn entity(cause: KafkaError) -> Self {
        Self {
            kind: AdminErrorKind::Entity,
            message: cause.to_string(),
            cause: Some(cause),
        }
    }

    pub(crate) fn internal_contract<M: Into<String>>(message: M) -> Self {
        Self {
            kind: AdminErrorKind::InternalContract,
            message: message.into(),
            cause: None,
        }
    }

    pub(crate) fn canceled() -> Self {
        Self {
            kind: AdminErrorKind::Canceled,
            message: "request was dropped before completion".into(),
            cause: None,
        }
    }

    pub fn kind(&self) -> AdminErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The native error this wraps, if any.
    pub fn cause(&self) -> Option<&KafkaError> {
        self.cause.as_ref()
    }

    /// Shortcut to the [`ErrorCode`] of [`Self::cause`].
    pub fn code(&self) -> Option<ErrorCode> {
        self.cause.as_ref().map(|c| c.code)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use rstest::rstest;

    use super::*;
    use crate::utils::is_thread_safe;

    #[rstest]
    #[case(-195, ErrorCode::Transport)]
    #[case(-185, ErrorCode::TimedOut)]
    #[case(3, ErrorCode::UnknownTopicOrPartition)]
    #[case(36, ErrorCode::TopicAlreadyExists)]
    #[case(69, ErrorCode::GroupIdNotFound)]
    #[case(12345, ErrorCode::Other(12345))]
    fn error_code_wire_mapping(#[case] wire: i32, #[case] expected: ErrorCode) {
        assert_eq!(ErrorCode::from(wire), expected);
        assert_eq!(i32::from(expected), wire);
    }

    #[test]
    fn admin_error_wraps_cause() {
        let cause = KafkaError::new(ErrorCode::TopicAlreadyExists, "Topic 'a' already exists.");
        let err = AdminError::entity(cause.clone());

        assert_eq!(err.kind(), AdminErrorKind::Entity);
        assert_eq!(err.cause(), Some(&cause));
        assert_eq!(err.code(), Some(ErrorCode::TopicAlreadyExists));
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "entity failed: TopicAlreadyExists(36): Topic 'a' already exists.");
    }

    #[test]
    fn internal_contract_has_no_cause() {
        let err = AdminError::internal_contract("Results length 1 is different from handles length 2");

        assert_eq!(err.kind(), AdminErrorKind::InternalContract);
        assert!(err.cause().is_none());
        assert!(err.source().is_none());
    }

    #[test]
    fn test_types_thread_safety() {
        is_thread_safe::<ValidationError>();
        is_thread_safe::<KafkaError>();
        is_thread_safe::<AdminError>();
    }
}
