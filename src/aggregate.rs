use std::fmt;

use log::{trace, warn};

use crate::errors::KafkaError;
use crate::native::AdminResponse;
use crate::options::AdminOperation;

/// What the native client resolves an [`AggregateCompleter`] with.
pub type AggregateOutcome = Result<AdminResponse, KafkaError>;

/// Continuation that splits the aggregate outcome of a request into its per-entity handles.
pub(crate) trait FanOut: Send {
    /// Invoked once the request is handed to the native client.
    fn start(&self);

    /// Resolves every handle. Consumes the continuation: it runs at most once.
    fn complete(self: Box<Self>, outcome: AggregateOutcome);
}

/// The single completion of a native admin call.
///
/// Handed to [`NativeClient::submit`] together with the request: the native client must
/// [`resolve`](AggregateCompleter::resolve) it, from whatever thread it likes, once the call
/// completes. Resolving consumes it, so it can only happen once.
///
/// If it is dropped without being resolved, every handle of the request fails
/// with [`AdminErrorKind::Canceled`].
///
/// [`NativeClient::submit`]: crate::NativeClient::submit
/// [`AdminErrorKind::Canceled`]: crate::AdminErrorKind::Canceled
pub struct AggregateCompleter {
    operation: AdminOperation,
    fan_out: Option<Box<dyn FanOut>>,
}

impl AggregateCompleter {
    pub(crate) fn new(operation: AdminOperation, fan_out: Box<dyn FanOut>) -> Self {
        fan_out.start();
        Self {
            operation,
            fan_out: Some(fan_out),
        }
    }

    /// The verb of the request this completes.
    pub fn operation(&self) -> AdminOperation {
        self.operation
    }

    /// Completes the request, with its per-entity results or with a request-level error.
    pub fn resolve(mut self, outcome: AggregateOutcome) {
        if let Some(fan_out) = self.fan_out.take() {
            trace!("Resolving {} aggregate: {}", self.operation, if outcome.is_ok() { "ok" } else { "error" });
            fan_out.complete(outcome);
        }
    }
}

impl Drop for AggregateCompleter {
    fn drop(&mut self) {
        if self.fan_out.is_some() {
            warn!("{} aggregate dropped without being resolved: canceling its handles", self.operation);
        }
    }
}

impl fmt::Debug for AggregateCompleter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregateCompleter")
            .field("operation", &self.operation)
            .field("resolved", &self.fan_out.is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::errors::ErrorCode;
    use crate::utils::is_send;

    #[derive(Default)]
    struct Counting {
        started: AtomicUsize,
        completed: AtomicUsize,
    }

    struct CountingFanOut(Arc<Counting>);

    impl FanOut for CountingFanOut {
        fn start(&self) {
            self.0.started.fetch_add(1, Ordering::SeqCst);
        }

        fn complete(self: Box<Self>, _outcome: AggregateOutcome) {
            self.0.completed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn continuation_runs_once() {
        let counts = Arc::new(Counting::default());
        let completer = AggregateCompleter::new(AdminOperation::DeleteTopics, Box::new(CountingFanOut(counts.clone())));
        assert_eq!(completer.operation(), AdminOperation::DeleteTopics);
        assert_eq!(counts.started.load(Ordering::SeqCst), 1);
        assert_eq!(counts.completed.load(Ordering::SeqCst), 0);

        completer.resolve(Err(KafkaError::new(ErrorCode::Transport, "down")));
        assert_eq!(counts.completed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropped_without_resolving() {
        let counts = Arc::new(Counting::default());
        drop(AggregateCompleter::new(
            AdminOperation::DeleteTopics,
            Box::new(CountingFanOut(counts.clone())),
        ));

        assert_eq!(counts.completed.load(Ordering::SeqCst), 0);
        // The continuation is gone with the completer.
        assert_eq!(Arc::strong_count(&counts), 1);
    }

    #[test]
    fn test_types_thread_safety() {
        is_send::<AggregateCompleter>();
    }
}
