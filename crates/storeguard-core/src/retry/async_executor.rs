//! Cancellable asynchronous retry execution
//!
//! [`AsyncRetryExecutor`] runs the same retry loop as
//! [`RetryExecutor`](super::RetryExecutor) on its own tokio task and hands
//! the caller a [`RetryHandle`] immediately.
//!
//! # Cancellation
//!
//! ```text
//! loop:
//!     token cancelled?  ── yes ──> Canceled
//!     run attempt (never interrupted)
//!     token cancelled?  ── yes ──> Canceled (attempt result discarded)
//!     success          ──────────> Fulfilled(value)
//!     bound reached    ──────────> Rejected(Exhausted)
//! ```
//!
//! Cancellation is only observed between attempts. An attempt already
//! dispatched runs to completion and its result is dropped.

use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

use tokio::runtime::Handle;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::types::RetryPolicy;

use super::error::RetryError;
use super::observer::{NoOpObserver, RetryObserver};
use super::outcome::{AttemptOutcome, RetryState, Step};

/// Terminal state of an asynchronous call
#[derive(Debug)]
pub enum Settlement<T, E> {
    /// An attempt succeeded
    Fulfilled(T),
    /// The call failed; see [`RetryError`]
    Rejected(RetryError<E>),
    /// The caller cancelled before the call settled otherwise
    Canceled,
}

impl<T, E> Settlement<T, E> {
    /// Check if the call produced a value
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Settlement::Fulfilled(_))
    }

    /// Check if the call failed
    pub fn is_rejected(&self) -> bool {
        matches!(self, Settlement::Rejected(_))
    }

    /// Check if the call was cancelled
    pub fn is_canceled(&self) -> bool {
        matches!(self, Settlement::Canceled)
    }

    /// The value, if fulfilled
    pub fn fulfilled(self) -> Option<T> {
        match self {
            Settlement::Fulfilled(value) => Some(value),
            _ => None,
        }
    }

    /// The failure, if rejected
    pub fn rejected(self) -> Option<RetryError<E>> {
        match self {
            Settlement::Rejected(err) => Some(err),
            _ => None,
        }
    }

    /// Collapse into a `Result`, with `Ok(None)` standing for cancellation
    pub fn into_result(self) -> Result<Option<T>, RetryError<E>> {
        match self {
            Settlement::Fulfilled(value) => Ok(Some(value)),
            Settlement::Rejected(err) => Err(err),
            Settlement::Canceled => Ok(None),
        }
    }
}

/// Handle to an in-flight asynchronous call
///
/// Await the handle (or poll it) for its [`Settlement`]. Dropping a handle
/// that has not settled cancels the call.
#[must_use = "dropping a RetryHandle cancels the call"]
pub struct RetryHandle<T, E> {
    operation: String,
    token: CancellationToken,
    task: JoinHandle<Settlement<T, E>>,
}

impl<T, E> RetryHandle<T, E> {
    /// Diagnostic name of the operation
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Request cancellation
    ///
    /// No further attempts are issued. An attempt in flight finishes and its
    /// result is discarded. A no-op once the call has settled.
    pub fn cancel(&self) {
        if !self.task.is_finished() {
            self.token.cancel();
        }
    }

    /// Whether cancellation has been requested
    ///
    /// Also true when the parent token passed to a `*_with_token` spawn was
    /// cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Whether the call has settled
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    fn settle_join(&self, joined: Result<Settlement<T, E>, JoinError>) -> Settlement<T, E> {
        match joined {
            Ok(settlement) => settlement,
            Err(err) if err.is_panic() => Settlement::Rejected(RetryError::aborted(
                &self.operation,
                panic_message(err.into_panic()),
            )),
            // Runtime shut down underneath the task
            Err(_) => Settlement::Canceled,
        }
    }
}

impl<T, E> Future for RetryHandle<T, E> {
    type Output = Settlement<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let joined = ready!(Pin::new(&mut this.task).poll(cx));
        Poll::Ready(this.settle_join(joined))
    }
}

impl<T, E> Drop for RetryHandle<T, E> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

impl<T, E> std::fmt::Debug for RetryHandle<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryHandle")
            .field("operation", &self.operation)
            .field("cancelled", &self.is_cancelled())
            .field("finished", &self.is_finished())
            .finish()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "operation panicked".to_string()
    }
}

/// A retry executor that runs each call on its own task
///
/// Build one with [`RetryExecutorBuilder::build_async`](super::RetryExecutorBuilder::build_async)
/// or [`AsyncRetryExecutor::new`].
pub struct AsyncRetryExecutor<O = NoOpObserver> {
    policy: RetryPolicy,
    observer: Arc<O>,
    runtime: Option<Handle>,
}

impl<O> Clone for AsyncRetryExecutor<O> {
    fn clone(&self) -> Self {
        Self {
            policy: self.policy,
            observer: Arc::clone(&self.observer),
            runtime: self.runtime.clone(),
        }
    }
}

impl AsyncRetryExecutor<NoOpObserver> {
    /// Create an executor without an observer, spawning on the ambient runtime
    pub fn new(policy: RetryPolicy) -> Self {
        Self::from_parts(policy, Arc::new(NoOpObserver), None)
    }
}

impl<O> AsyncRetryExecutor<O> {
    pub(crate) fn from_parts(policy: RetryPolicy, observer: Arc<O>, runtime: Option<Handle>) -> Self {
        Self {
            policy,
            observer,
            runtime,
        }
    }

    /// The policy every call through this executor uses
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl<O> AsyncRetryExecutor<O>
where
    O: RetryObserver + 'static,
{
    /// Retry a blocking operation on the blocking thread pool
    ///
    /// # Panics
    ///
    /// Panics if no runtime was configured and this is called outside a
    /// tokio runtime.
    pub fn spawn_blocking<F, T, E>(&self, operation: impl Into<String>, op: F) -> RetryHandle<T, E>
    where
        F: FnMut() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Display + Send + 'static,
    {
        self.spawn_blocking_with_token(operation, &CancellationToken::new(), op)
    }

    /// Like [`spawn_blocking`](Self::spawn_blocking), cancelled also when
    /// `parent` is cancelled
    pub fn spawn_blocking_with_token<F, T, E>(
        &self,
        operation: impl Into<String>,
        parent: &CancellationToken,
        mut op: F,
    ) -> RetryHandle<T, E>
    where
        F: FnMut() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Display + Send + 'static,
    {
        let operation = operation.into();
        let token = parent.child_token();
        let policy = self.policy;
        let observer = Arc::clone(&self.observer);
        let task_token = token.clone();
        let task_operation = operation.clone();

        let body = move || {
            let mut state = RetryState::new(&task_operation, &policy, observer.as_ref());
            loop {
                if task_token.is_cancelled() {
                    state.cancel();
                    return Settlement::Canceled;
                }
                state.begin_attempt();
                let outcome = AttemptOutcome::from(op());
                if task_token.is_cancelled() {
                    state.abandon(outcome);
                    return Settlement::Canceled;
                }
                match state.record(outcome) {
                    Step::Done(value) => return Settlement::Fulfilled(value),
                    Step::Retry => continue,
                    Step::Exhausted(err) => return Settlement::Rejected(err),
                }
            }
        };

        let task = match &self.runtime {
            Some(runtime) => runtime.spawn_blocking(body),
            None => tokio::task::spawn_blocking(body),
        };

        RetryHandle {
            operation,
            token,
            task,
        }
    }

    /// Retry an asynchronous operation on a tokio task
    ///
    /// The loop yields to the scheduler between attempts.
    ///
    /// # Panics
    ///
    /// Panics if no runtime was configured and this is called outside a
    /// tokio runtime.
    pub fn spawn<F, Fut, T, E>(&self, operation: impl Into<String>, op: F) -> RetryHandle<T, E>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Display + Send + 'static,
    {
        self.spawn_with_token(operation, &CancellationToken::new(), op)
    }

    /// Like [`spawn`](Self::spawn), cancelled also when `parent` is cancelled
    pub fn spawn_with_token<F, Fut, T, E>(
        &self,
        operation: impl Into<String>,
        parent: &CancellationToken,
        mut op: F,
    ) -> RetryHandle<T, E>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Display + Send + 'static,
    {
        let operation = operation.into();
        let token = parent.child_token();
        let policy = self.policy;
        let observer = Arc::clone(&self.observer);
        let task_token = token.clone();
        let task_operation = operation.clone();

        let body = async move {
            let mut state = RetryState::new(&task_operation, &policy, observer.as_ref());
            loop {
                if task_token.is_cancelled() {
                    state.cancel();
                    return Settlement::Canceled;
                }
                state.begin_attempt();
                let outcome = AttemptOutcome::from(op().await);
                if task_token.is_cancelled() {
                    state.abandon(outcome);
                    return Settlement::Canceled;
                }
                match state.record(outcome) {
                    Step::Done(value) => return Settlement::Fulfilled(value),
                    Step::Retry => tokio::task::yield_now().await,
                    Step::Exhausted(err) => return Settlement::Rejected(err),
                }
            }
        };

        let task = match &self.runtime {
            Some(runtime) => runtime.spawn(body),
            None => tokio::spawn(body),
        };

        RetryHandle {
            operation,
            token,
            task,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::observer::StatsObserver;
    use crate::retry::RetryExecutorBuilder;

    #[tokio::test]
    async fn test_blocking_fulfilled() {
        let executor = AsyncRetryExecutor::new(RetryPolicy::bounded(2));
        let mut attempts = 0;

        let handle = executor.spawn_blocking("op", move || {
            attempts += 1;
            if attempts < 3 {
                Err("throttled")
            } else {
                Ok(attempts)
            }
        });

        assert_eq!(handle.operation(), "op");
        assert_eq!(handle.await.fulfilled(), Some(3));
    }

    #[tokio::test]
    async fn test_async_rejected() {
        let observer = Arc::new(StatsObserver::new());
        let executor = RetryExecutorBuilder::new()
            .with_policy(RetryPolicy::bounded(1))
            .with_observer(observer.clone())
            .build_async();

        let settlement: Settlement<(), _> = executor
            .spawn("op", || async { Err("unavailable") })
            .await;

        let err = settlement.rejected().expect("should be rejected");
        assert_eq!(err.attempts(), Some(2));
        assert!(err.to_string().contains("unavailable"));
        assert_eq!(observer.exhaustions(), 1);
    }

    #[tokio::test]
    async fn test_cancel_before_start_makes_no_attempt() {
        let parent = CancellationToken::new();
        parent.cancel();

        let observer = Arc::new(StatsObserver::new());
        let executor = RetryExecutorBuilder::new()
            .with_observer(observer.clone())
            .build_async();

        let handle = executor.spawn_with_token("op", &parent, || async { Ok::<_, &str>(1) });
        assert!(handle.is_cancelled());
        assert!(handle.await.is_canceled());
        assert_eq!(observer.attempt_starts(), 0);
        assert_eq!(observer.cancellations(), 1);
    }

    #[tokio::test]
    async fn test_handle_cancel_leaves_parent_untouched() {
        let parent = CancellationToken::new();
        let executor = AsyncRetryExecutor::new(RetryPolicy::unbounded());

        let handle = executor.spawn_with_token("op", &parent, || async {
            Err::<(), _>("down")
        });
        handle.cancel();

        assert!(handle.await.is_canceled());
        assert!(!parent.is_cancelled());
    }

    #[tokio::test]
    async fn test_panicking_operation_is_rejected() {
        let executor = AsyncRetryExecutor::new(RetryPolicy::unbounded());

        let settlement: Settlement<(), &str> = executor
            .spawn_blocking("op", || panic!("backend client bug"))
            .await;

        let err = settlement.rejected().expect("should be rejected");
        assert!(err.is_aborted());
        assert!(err.to_string().contains("backend client bug"));
    }

    #[test]
    fn test_settlement_into_result() {
        let fulfilled: Settlement<u32, &str> = Settlement::Fulfilled(1);
        assert_eq!(fulfilled.into_result().unwrap(), Some(1));

        let canceled: Settlement<u32, &str> = Settlement::Canceled;
        assert_eq!(canceled.into_result().unwrap(), None);

        let rejected: Settlement<u32, &str> = Settlement::Rejected(RetryError::aborted("op", "x"));
        assert!(rejected.into_result().is_err());
    }
}
