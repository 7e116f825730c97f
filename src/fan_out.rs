use std::collections::HashMap;

use log::{debug, error, trace, warn};

use crate::aggregate::{AggregateOutcome, FanOut};
use crate::errors::{AdminError, AdminErrorKind};
use crate::handle::{completion_pair, Completer, CompletionHandle, HandleMap};
use crate::native::{AdminResponse, AsEntityKey, EntityKey, EntityResult, FromResultValue};
use crate::options::AdminOperation;

/// How the records of a response are matched to the handles of a request.
enum Matching {
    /// By natural key: index of the handle for each key.
    Keyed(HashMap<EntityKey, usize>),

    /// By position.
    Ordered,
}

/// Fans a per-entity response out to one handle per entity.
///
/// Every record is checked before resolving any handle: if the response breaks
/// the contract with the native client, all handles fail the same way.
pub(crate) struct MapFanOut<V> {
    operation: AdminOperation,
    matching: Matching,
    completers: Vec<Completer<V>>,
}

/// Handles matched to [`AdminResponse::Keyed`] records, by natural key.
///
/// Keys are expected to be unique: uniqueness is part of request validation.
pub(crate) fn keyed<K: AsEntityKey, V>(operation: AdminOperation, keys: Vec<K>) -> (HandleMap<K, V>, MapFanOut<V>) {
    let index = keys.iter().enumerate().map(|(i, k)| (k.entity_key(), i)).collect();
    let (handles, completers) = handle_pairs(keys);

    (
        handles,
        MapFanOut {
            operation,
            matching: Matching::Keyed(index),
            completers,
        },
    )
}

/// Handles matched to [`AdminResponse::Ordered`] records, by position.
pub(crate) fn ordered<K, V>(operation: AdminOperation, keys: Vec<K>) -> (HandleMap<K, V>, MapFanOut<V>) {
    let (handles, completers) = handle_pairs(keys);

    (
        handles,
        MapFanOut {
            operation,
            matching: Matching::Ordered,
            completers,
        },
    )
}

fn handle_pairs<K, V>(keys: Vec<K>) -> (HandleMap<K, V>, Vec<Completer<V>>) {
    let mut entries = Vec::with_capacity(keys.len());
    let mut completers = Vec::with_capacity(keys.len());
    for key in keys {
        let (completer, handle) = completion_pair();
        completers.push(completer);
        entries.push((key, handle));
    }

    (HandleMap::from_entries(entries), completers)
}

impl<V: FromResultValue + Send + 'static> FanOut for MapFanOut<V> {
    fn start(&self) {
        self.completers.iter().for_each(Completer::mark_running);
    }

    fn complete(self: Box<Self>, outcome: AggregateOutcome) {
        let MapFanOut {
            operation,
            matching,
            completers,
        } = *self;

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                warn!("{operation} request failed, failing all its {} handle(s): {e}", completers.len());
                return fail_all(completers, AdminError::request(e));
            },
        };

        match assign::<V>(&matching, completers.len(), response) {
            Ok(results) => {
                debug!("{operation} completed, resolving {} handle(s)", completers.len());
                for (completer, result) in completers.into_iter().zip(results) {
                    completer.resolve(result);
                }
            },
            Err(msg) => {
                error!("{operation} completed with unexpected results: {msg}");
                fail_all(completers, AdminError::internal_contract(msg));
            },
        }
    }
}

fn fail_all<V>(completers: Vec<Completer<V>>, err: AdminError) {
    for completer in completers {
        completer.resolve(Err(err.clone()));
    }
}

/// Matches the records of `response` to `expected` handles, returning the outcome of each handle.
fn assign<V: FromResultValue>(
    matching: &Matching,
    expected: usize,
    response: AdminResponse,
) -> Result<Vec<Result<V, AdminError>>, String> {
    match (matching, response) {
        (Matching::Keyed(index), AdminResponse::Keyed(records)) => {
            check_len(records.len(), expected)?;

            let mut slots: Vec<Option<Result<V, AdminError>>> = (0..expected).map(|_| None).collect();
            for (key, record) in records {
                let slot = index
                    .get(&key)
                    .and_then(|i| slots.get_mut(*i))
                    .ok_or_else(|| format!("Key '{key}' not found in handle map"))?;
                if slot.is_some() {
                    return Err(format!("Key '{key}' found more than once in results"));
                }
                trace!("Matched result for '{key}'");
                *slot = Some(convert(record)?);
            }

            // Same length, no key seen twice: every slot is filled.
            Ok(slots.into_iter().flatten().collect())
        },
        (Matching::Ordered, AdminResponse::Ordered(records)) => {
            check_len(records.len(), expected)?;
            records.into_iter().map(convert::<V>).collect()
        },
        (Matching::Keyed(_), other) => Err(format!("Expected keyed results, got {} results", other.shape())),
        (Matching::Ordered, other) => Err(format!("Expected ordered results, got {} results", other.shape())),
    }
}

fn check_len(got: usize, expected: usize) -> Result<(), String> {
    if got != expected {
        return Err(format!("Results length {got} is different from handle map length {expected}"));
    }

    Ok(())
}

/// Per-entity record to handle outcome: `Err` only if the payload has the wrong type.
fn convert<V: FromResultValue>(record: EntityResult) -> Result<Result<V, AdminError>, String> {
    match record {
        Ok(value) => V::from_result_value(value)
            .map(Ok)
            .map_err(|other| format!("Unexpected {} result value", other.kind())),
        Err(e) => Ok(Err(AdminError::entity(e))),
    }
}

/// Resolves the one handle of a request that has no per-entity results.
pub(crate) struct SingleFanOut<V> {
    operation: AdminOperation,
    completer: Completer<V>,
    extract: fn(AdminResponse) -> Result<V, AdminError>,
}

/// A single handle, resolved with the [`AdminResponse::Single`] value of the response.
pub(crate) fn single<V: FromResultValue>(operation: AdminOperation) -> (CompletionHandle<V>, SingleFanOut<V>) {
    single_with(operation, single_value::<V>)
}

/// A single handle, resolved with what `extract` makes of the response.
pub(crate) fn single_with<V>(
    operation: AdminOperation,
    extract: fn(AdminResponse) -> Result<V, AdminError>,
) -> (CompletionHandle<V>, SingleFanOut<V>) {
    let (completer, handle) = completion_pair();

    (
        handle,
        SingleFanOut {
            operation,
            completer,
            extract,
        },
    )
}

impl<V: Send + 'static> FanOut for SingleFanOut<V> {
    fn start(&self) {
        self.completer.mark_running();
    }

    fn complete(self: Box<Self>, outcome: AggregateOutcome) {
        let SingleFanOut {
            operation,
            completer,
            extract,
        } = *self;

        let result = match outcome {
            Ok(response) => extract(response),
            Err(e) => {
                warn!("{operation} request failed: {e}");
                Err(AdminError::request(e))
            },
        };

        match &result {
            Ok(_) => debug!("{operation} completed"),
            Err(e) if e.kind() == AdminErrorKind::InternalContract => {
                error!("{operation} completed with unexpected results: {}", e.message())
            },
            Err(_) => {},
        }

        completer.resolve(result);
    }
}

fn single_value<V: FromResultValue>(response: AdminResponse) -> Result<V, AdminError> {
    match response {
        AdminResponse::Single(value) => V::from_result_value(value)
            .map_err(|other| AdminError::internal_contract(format!("Unexpected {} result value", other.kind()))),
        other => Err(AdminError::internal_contract(format!(
            "Expected single result, got {} results",
            other.shape()
        ))),
    }
}

/// All the keyed records, by name, or the first per-entity error among them.
///
/// Used when the request has no entities to key handles by (e.g. "describe every user"),
/// but the native client still reports per-entity results.
pub(crate) fn all_by_name<V: FromResultValue>(response: AdminResponse) -> Result<HashMap<String, V>, AdminError> {
    let records = match response {
        AdminResponse::Keyed(records) => records,
        other => {
            return Err(AdminError::internal_contract(format!(
                "Expected keyed results, got {} results",
                other.shape()
            )))
        },
    };

    let mut values = HashMap::with_capacity(records.len());
    for (key, record) in records {
        let name = match key {
            EntityKey::Name(name) => name,
            other => return Err(AdminError::internal_contract(format!("Unexpected key '{other}' in results"))),
        };
        let value = V::from_result_value(record.map_err(AdminError::entity)?)
            .map_err(|other| AdminError::internal_contract(format!("Unexpected {} result value", other.kind())))?;
        if values.insert(name.clone(), value).is_some() {
            return Err(AdminError::internal_contract(format!(
                "Key '{name}' found more than once in results"
            )));
        }
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigEntries, ConfigResource, ResourceType};
    use crate::errors::{ErrorCode, KafkaError};
    use crate::handle::HandleState;
    use crate::native::ResultValue;
    use crate::offsets::{DeletedRecords, TopicPartition};
    use crate::scram::UserScramCredentialsDescription;

    fn topics(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn complete<F: FanOut + 'static>(fan_out: F, outcome: AggregateOutcome) {
        Box::new(fan_out).complete(outcome)
    }

    #[test]
    fn keyed_results_matched_by_key_not_position() {
        let (handles, fan_out) = keyed::<_, ()>(AdminOperation::CreateTopics, topics(&["a", "b", "c"]));
        fan_out.start();
        assert!(handles.iter().all(|(_, h)| h.state() == HandleState::Running));

        complete(
            fan_out,
            Ok(AdminResponse::Keyed(vec![
                ("c".into(), Ok(ResultValue::None)),
                (
                    "a".into(),
                    Err(KafkaError::new(ErrorCode::TopicAlreadyExists, "Topic 'a' already exists.")),
                ),
                ("b".into(), Ok(ResultValue::None)),
            ])),
        );

        let outcomes = handles.wait_all();
        assert_eq!(outcomes[0].0, "a");
        assert_eq!(outcomes[0].1.as_ref().unwrap_err().code(), Some(ErrorCode::TopicAlreadyExists));
        assert_eq!(outcomes[0].1.as_ref().unwrap_err().kind(), AdminErrorKind::Entity);
        assert_eq!(outcomes[1].1, Ok(()));
        assert_eq!(outcomes[2].1, Ok(()));
    }

    #[test]
    fn keyed_by_resource() {
        let resources = vec![
            ConfigResource::new(ResourceType::Topic, "orders"),
            ConfigResource::new(ResourceType::Broker, "1"),
        ];
        let (handles, fan_out) = keyed::<_, ConfigEntries>(AdminOperation::DescribeConfigs, resources);

        complete(
            fan_out,
            Ok(AdminResponse::Keyed(vec![
                (
                    EntityKey::Resource(ResourceType::Broker, "1".into()),
                    Ok(ResultValue::Configs(ConfigEntries::new())),
                ),
                (
                    EntityKey::Resource(ResourceType::Topic, "orders".into()),
                    Err(KafkaError::new(ErrorCode::UnknownTopicOrPartition, "unknown")),
                ),
            ])),
        );

        let outcomes = handles.wait_all();
        assert!(outcomes[0].1.is_err());
        assert_eq!(outcomes[1].1, Ok(ConfigEntries::new()));
    }

    #[test]
    fn request_error_fails_every_handle() {
        let (handles, fan_out) = keyed::<_, ()>(AdminOperation::DeleteTopics, topics(&["a", "b", "c"]));
        let cause = KafkaError::new(ErrorCode::Transport, "Broker transport failure");

        complete(fan_out, Err(cause.clone()));

        for (_, outcome) in handles.wait_all() {
            let err = outcome.unwrap_err();
            assert_eq!(err.kind(), AdminErrorKind::Request);
            assert_eq!(err.cause(), Some(&cause));
        }
    }

    #[test]
    fn count_mismatch_fails_every_handle() {
        let (handles, fan_out) = keyed::<_, ()>(AdminOperation::CreateTopics, topics(&["a", "b"]));

        complete(fan_out, Ok(AdminResponse::Keyed(vec![("a".into(), Ok(ResultValue::None))])));

        for (_, outcome) in handles.wait_all() {
            let err = outcome.unwrap_err();
            assert_eq!(err.kind(), AdminErrorKind::InternalContract);
            assert_eq!(err.message(), "Results length 1 is different from handle map length 2");
        }
    }

    #[test]
    fn unknown_key_fails_every_handle() {
        let (handles, fan_out) = keyed::<_, ()>(AdminOperation::CreateTopics, topics(&["a", "b"]));

        complete(
            fan_out,
            Ok(AdminResponse::Keyed(vec![
                ("a".into(), Ok(ResultValue::None)),
                ("z".into(), Ok(ResultValue::None)),
            ])),
        );

        for (_, outcome) in handles.wait_all() {
            assert_eq!(outcome.unwrap_err().message(), "Key 'z' not found in handle map");
        }
    }

    #[test]
    fn repeated_key_fails_every_handle() {
        let (handles, fan_out) = keyed::<_, ()>(AdminOperation::CreateTopics, topics(&["a", "b"]));

        complete(
            fan_out,
            Ok(AdminResponse::Keyed(vec![
                ("a".into(), Ok(ResultValue::None)),
                ("a".into(), Ok(ResultValue::None)),
            ])),
        );

        for (_, outcome) in handles.wait_all() {
            assert_eq!(outcome.unwrap_err().kind(), AdminErrorKind::InternalContract);
        }
    }

    #[test]
    fn wrong_payload_type_leaves_no_partial_batch() {
        let (handles, fan_out) = ordered::<_, ()>(AdminOperation::DeleteConsumerGroups, topics(&["g1", "g2"]));

        complete(
            fan_out,
            Ok(AdminResponse::Ordered(vec![
                Ok(ResultValue::None),
                Ok(ResultValue::DeletedRecords(DeletedRecords { low_watermark: 1 })),
            ])),
        );

        // First record was fine, but the batch is rejected as a whole.
        for (_, outcome) in handles.wait_all() {
            let err = outcome.unwrap_err();
            assert_eq!(err.kind(), AdminErrorKind::InternalContract);
            assert_eq!(err.message(), "Unexpected DeletedRecords result value");
        }
    }

    #[test]
    fn ordered_results_matched_by_position() {
        let (handles, fan_out) = ordered::<_, ()>(AdminOperation::DeleteConsumerGroups, topics(&["g1", "g2"]));

        complete(
            fan_out,
            Ok(AdminResponse::Ordered(vec![
                Err(KafkaError::new(ErrorCode::NonEmptyGroup, "group is not empty")),
                Ok(ResultValue::None),
            ])),
        );

        let outcomes = handles.wait_all();
        assert_eq!(outcomes[0].1.as_ref().unwrap_err().code(), Some(ErrorCode::NonEmptyGroup));
        assert_eq!(outcomes[1].1, Ok(()));
    }

    #[test]
    fn shape_mismatch_fails_every_handle() {
        let (handles, fan_out) = ordered::<_, ()>(AdminOperation::DeleteConsumerGroups, topics(&["g1"]));

        complete(fan_out, Ok(AdminResponse::Single(ResultValue::None)));

        let outcomes = handles.wait_all();
        assert_eq!(
            outcomes[0].1.as_ref().unwrap_err().message(),
            "Expected ordered results, got single results"
        );
    }

    #[test]
    fn single_handle() {
        let (handle, fan_out) = single::<DeletedRecords>(AdminOperation::DeleteRecords);
        fan_out.start();
        assert_eq!(handle.state(), HandleState::Running);

        complete(
            fan_out,
            Ok(AdminResponse::Single(ResultValue::DeletedRecords(DeletedRecords { low_watermark: 3 }))),
        );
        assert_eq!(handle.wait(), Ok(DeletedRecords { low_watermark: 3 }));

        let (handle, fan_out) = single::<()>(AdminOperation::DescribeCluster);
        complete(fan_out, Ok(AdminResponse::Ordered(vec![])));
        assert_eq!(handle.wait().unwrap_err().kind(), AdminErrorKind::InternalContract);
    }

    fn describe_all() -> (
        CompletionHandle<HashMap<String, UserScramCredentialsDescription>>,
        SingleFanOut<HashMap<String, UserScramCredentialsDescription>>,
    ) {
        single_with(
            AdminOperation::DescribeUserScramCredentials,
            all_by_name::<UserScramCredentialsDescription>,
        )
    }

    #[test]
    fn all_by_name_fails_on_any_entity_error() {
        let description = |user: &str| UserScramCredentialsDescription {
            user: user.into(),
            scram_credential_infos: vec![],
        };

        let (handle, fan_out) = describe_all();
        complete(
            fan_out,
            Ok(AdminResponse::Keyed(vec![
                ("alice".into(), Ok(ResultValue::ScramCredentials(description("alice")))),
                ("bob".into(), Ok(ResultValue::ScramCredentials(description("bob")))),
            ])),
        );
        let all = handle.wait().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["bob"], description("bob"));

        let (handle, fan_out) = describe_all();
        complete(
            fan_out,
            Ok(AdminResponse::Keyed(vec![
                ("alice".into(), Ok(ResultValue::ScramCredentials(description("alice")))),
                ("bob".into(), Err(KafkaError::new(ErrorCode::ResourceNotFound, "no credentials"))),
            ])),
        );
        let err = handle.wait().unwrap_err();
        assert_eq!(err.kind(), AdminErrorKind::Entity);
        assert_eq!(err.code(), Some(ErrorCode::ResourceNotFound));

        let (handle, fan_out) = describe_all();
        complete(
            fan_out,
            Ok(AdminResponse::Keyed(vec![(
                EntityKey::from(&TopicPartition::new("orders", 0)),
                Ok(ResultValue::ScramCredentials(description("alice"))),
            )])),
        );
        assert_eq!(handle.wait().unwrap_err().kind(), AdminErrorKind::InternalContract);
    }
}
