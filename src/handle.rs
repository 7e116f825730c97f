use std::borrow::Borrow;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::executor::block_on;
use futures::future::join_all;
use futures::FutureExt;

use crate::errors::AdminError;

const STATE_PENDING: u8 = 0;
const STATE_RUNNING: u8 = 1;
const STATE_SUCCEEDED: u8 = 2;
const STATE_FAILED: u8 = 3;

/// Where a [`CompletionHandle`] is in its lifecycle.
///
/// A handle goes `Pending -> Running -> Succeeded | Failed`, and never leaves a terminal state.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum HandleState {
    /// Created, request not handed to the native client yet.
    Pending,
    /// Request handed to the native client, waiting for its outcome.
    Running,
    /// Resolved with a value.
    Succeeded,
    /// Resolved with an [`AdminError`].
    Failed,
}

impl HandleState {
    fn from_u8(state: u8) -> Self {
        match state {
            STATE_PENDING => HandleState::Pending,
            STATE_RUNNING => HandleState::Running,
            STATE_SUCCEEDED => HandleState::Succeeded,
            _ => HandleState::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, HandleState::Succeeded | HandleState::Failed)
    }
}

/// Creates a connected pair: the side that resolves, and the side the caller observes.
pub(crate) fn completion_pair<T>() -> (Completer<T>, CompletionHandle<T>) {
    let (tx, rx) = oneshot::channel();
    let state = Arc::new(AtomicU8::new(STATE_PENDING));

    (
        Completer {
            tx: Some(tx),
            state: state.clone(),
        },
        CompletionHandle { rx, state, taken: false },
    )
}

/// Resolving side of a [`CompletionHandle`].
///
/// [`Completer::resolve`] consumes it: a handle can't be resolved twice.
/// Dropping it unresolved fails the handle with an [`AdminErrorKind::Canceled`] error.
///
/// [`AdminErrorKind::Canceled`]: crate::AdminErrorKind::Canceled
pub(crate) struct Completer<T> {
    tx: Option<oneshot::Sender<Result<T, AdminError>>>,
    state: Arc<AtomicU8>,
}

impl<T> Completer<T> {
    pub(crate) fn mark_running(&self) {
        let _ = self
            .state
            .compare_exchange(STATE_PENDING, STATE_RUNNING, Ordering::AcqRel, Ordering::Acquire);
    }

    pub(crate) fn resolve(mut self, outcome: Result<T, AdminError>) {
        if let Some(tx) = self.tx.take() {
            let state = if outcome.is_ok() {
                STATE_SUCCEEDED
            } else {
                STATE_FAILED
            };

            // Caller might have dropped the handle already: nobody left to tell.
            let _ = tx.send(outcome);
            // Only terminal once the outcome can be taken.
            self.state.store(state, Ordering::Release);
        }
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            drop(tx);
            self.state.store(STATE_FAILED, Ordering::Release);
        }
    }
}

/// The eventual outcome of the work requested for one entity.
///
/// It can be awaited (it's a [`Future`]), blocked on with [`CompletionHandle::wait`],
/// or polled without blocking with [`CompletionHandle::try_result`].
pub struct CompletionHandle<T> {
    rx: oneshot::Receiver<Result<T, AdminError>>,
    state: Arc<AtomicU8>,
    taken: bool,
}

impl<T> CompletionHandle<T> {
    pub fn state(&self) -> HandleState {
        HandleState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Has this handle reached a terminal state?
    pub fn is_done(&self) -> bool {
        self.state().is_terminal()
    }

    /// Takes the outcome, if already available.
    ///
    /// Returns `None` while the handle is not resolved, and after the outcome was taken.
    pub fn try_result(&mut self) -> Option<Result<T, AdminError>> {
        if self.taken {
            return None;
        }

        let outcome = match self.rx.try_recv() {
            Ok(Some(outcome)) => outcome,
            Ok(None) => return None,
            Err(oneshot::Canceled) => Err(AdminError::canceled()),
        };
        self.taken = true;

        Some(outcome)
    }

    /// Blocks the current thread until the handle is resolved.
    pub fn wait(self) -> Result<T, AdminError> {
        block_on(self)
    }
}

impl<T> Future for CompletionHandle<T> {
    type Output = Result<T, AdminError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.rx
            .poll_unpin(cx)
            .map(|received| received.unwrap_or_else(|_| Err(AdminError::canceled())))
    }
}

impl<T> fmt::Debug for CompletionHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionHandle").field("state", &self.state()).finish()
    }
}

/// Handles of a batch request, by entity key, in the order the entities were submitted.
///
/// All the handles of one request are currently resolved together, when the single
/// native call behind them completes. Code should not rely on that:
/// treat each handle as independent.
pub struct HandleMap<K, V> {
    entries: Vec<(K, CompletionHandle<V>)>,
}

impl<K, V> HandleMap<K, V> {
    pub(crate) fn from_entries(entries: Vec<(K, CompletionHandle<V>)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &CompletionHandle<V>)> {
        self.entries.iter().map(|(k, h)| (k, h))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut CompletionHandle<V>)> {
        self.entries.iter_mut().map(|(k, h)| (&*k, h))
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&CompletionHandle<V>>
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.entries.iter().find(|(k, _)| k.borrow() == key).map(|(_, h)| h)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut CompletionHandle<V>>
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        let pos = self.entries.iter().position(|(k, _)| k.borrow() == key)?;
        Some(&mut self.entries[pos].1)
    }

    /// Takes the handle of `key` out of the map.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<CompletionHandle<V>>
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        let pos = self.entries.iter().position(|(k, _)| k.borrow() == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Awaits every handle, returning the outcomes in submission order.
    pub async fn join_all(self) -> Vec<(K, Result<V, AdminError>)> {
        let (keys, handles): (Vec<K>, Vec<CompletionHandle<V>>) = self.entries.into_iter().unzip();
        keys.into_iter().zip(join_all(handles).await).collect()
    }

    /// Blocks the current thread until every handle is resolved.
    pub fn wait_all(self) -> Vec<(K, Result<V, AdminError>)> {
        block_on(self.join_all())
    }
}

impl<K, V> IntoIterator for HandleMap<K, V> {
    type Item = (K, CompletionHandle<V>);
    type IntoIter = std::vec::IntoIter<(K, CompletionHandle<V>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: fmt::Debug, V> fmt::Debug for HandleMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter().map(|(k, h)| (k, h))).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use rstest::rstest;

    use super::*;
    use crate::errors::{AdminErrorKind, ErrorCode, KafkaError};
    use crate::utils::{is_send, is_thread_safe};

    #[test]
    fn resolves_once_with_value() {
        let (completer, mut handle) = completion_pair::<u32>();
        assert_eq!(handle.state(), HandleState::Pending);
        assert!(handle.try_result().is_none());

        completer.mark_running();
        assert_eq!(handle.state(), HandleState::Running);

        completer.resolve(Ok(7));
        assert_eq!(handle.state(), HandleState::Succeeded);
        assert!(handle.is_done());
        assert_eq!(handle.try_result(), Some(Ok(7)));

        // Outcome can only be taken once.
        assert_eq!(handle.try_result(), None);
        assert_eq!(handle.state(), HandleState::Succeeded);
    }

    #[test]
    fn resolves_with_error() {
        let (completer, handle) = completion_pair::<()>();
        let err = AdminError::entity(KafkaError::new(ErrorCode::TopicAlreadyExists, "exists"));

        completer.resolve(Err(err.clone()));
        assert_eq!(handle.state(), HandleState::Failed);
        assert_eq!(handle.wait(), Err(err));
    }

    #[test]
    fn dropped_completer_cancels() {
        let (completer, handle) = completion_pair::<()>();
        drop(completer);

        assert_eq!(handle.state(), HandleState::Failed);
        assert_eq!(handle.wait().unwrap_err().kind(), AdminErrorKind::Canceled);
    }

    #[test]
    fn resolved_from_another_thread() {
        let (completer, handle) = completion_pair::<String>();
        let t = thread::spawn(move || completer.resolve(Ok("done".into())));

        assert_eq!(handle.wait(), Ok("done".to_string()));
        t.join().unwrap();
    }

    #[rstest]
    #[case::succeeded(Ok(3))]
    #[case::failed(Err(AdminError::canceled()))]
    fn outcome_available_once_done(#[case] outcome: Result<u64, AdminError>) {
        for _ in 0..1_000 {
            let (completer, mut handle) = completion_pair::<u64>();
            let expected = outcome.clone();
            let t = thread::spawn(move || completer.resolve(expected));

            while !handle.is_done() {
                std::hint::spin_loop();
            }
            assert_eq!(handle.try_result(), Some(outcome.clone()));
            t.join().unwrap();
        }
    }

    #[test]
    fn resolving_after_handle_dropped_is_harmless() {
        let (completer, handle) = completion_pair::<u8>();
        drop(handle);
        completer.resolve(Ok(1));
    }

    #[test]
    fn handle_map_lookup_and_order() {
        let mut completers = Vec::new();
        let mut entries = Vec::new();
        for topic in ["c", "a", "b"] {
            let (completer, handle) = completion_pair::<usize>();
            completers.push(completer);
            entries.push((topic.to_string(), handle));
        }
        let mut map = HandleMap::from_entries(entries);

        assert_eq!(map.len(), 3);
        assert_eq!(map.keys().cloned().collect::<Vec<_>>(), vec!["c", "a", "b"]);
        assert!(map.get("a").is_some());
        assert!(map.get("z").is_none());

        for (i, completer) in completers.into_iter().enumerate() {
            completer.resolve(Ok(i));
        }

        assert_eq!(map.get_mut("b").and_then(CompletionHandle::try_result), Some(Ok(2)));
        let removed = map.remove("c").unwrap();
        assert_eq!(removed.wait(), Ok(0));

        let outcomes = map.wait_all();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0], ("a".to_string(), Ok(1)));
        // Outcome of "b" was taken already.
        assert_eq!(outcomes[1].1.as_ref().unwrap_err().kind(), AdminErrorKind::Canceled);
    }

    #[test]
    fn test_types_thread_safety() {
        is_thread_safe::<HandleState>();
        is_send::<CompletionHandle<()>>();
        is_send::<HandleMap<String, ()>>();
    }
}
