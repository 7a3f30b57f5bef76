//! Blocking retry execution
//!
//! [`RetryExecutor`] re-issues a fallible operation back-to-back on the
//! calling thread until it succeeds or the policy's bound is reached. There is
//! no delay between attempts.

use std::fmt::Display;
use std::sync::Arc;

use tokio::runtime::Handle;

use crate::types::RetryPolicy;

use super::async_executor::AsyncRetryExecutor;
use super::error::RetryError;
use super::observer::{NoOpObserver, RetryObserver};
use super::outcome::{AttemptOutcome, RetryState, Step};

/// Execute a blocking operation with the default executor
///
/// This is a convenience function for simple retry scenarios. For an
/// observer, use [`RetryExecutorBuilder`].
///
/// # Example
///
/// ```rust
/// use storeguard_core::retry::retry_blocking;
/// use storeguard_core::types::RetryPolicy;
///
/// let mut calls = 0;
/// let value = retry_blocking(&RetryPolicy::bounded(2), "fetch", || {
///     calls += 1;
///     if calls < 3 { Err("throttled") } else { Ok("ok") }
/// });
///
/// assert_eq!(value.unwrap(), "ok");
/// assert_eq!(calls, 3);
/// ```
pub fn retry_blocking<F, T, E>(
    policy: &RetryPolicy,
    operation: &str,
    op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Result<T, E>,
    E: Display,
{
    RetryExecutor::new(*policy).execute(operation, op)
}

/// Builder for configuring retry executors
///
/// # Example
///
/// ```rust
/// use storeguard_core::retry::{RetryExecutorBuilder, TracingObserver};
/// use storeguard_core::types::RetryPolicy;
///
/// let executor = RetryExecutorBuilder::new()
///     .with_policy(RetryPolicy::bounded(3))
///     .with_observer(TracingObserver::new("PlayerData"))
///     .build();
/// ```
pub struct RetryExecutorBuilder<O = NoOpObserver> {
    policy: RetryPolicy,
    observer: O,
    runtime: Option<Handle>,
}

impl Default for RetryExecutorBuilder<NoOpObserver> {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryExecutorBuilder<NoOpObserver> {
    /// Create a new builder with an unbounded policy and no observer
    pub fn new() -> Self {
        Self {
            policy: RetryPolicy::default(),
            observer: NoOpObserver,
            runtime: None,
        }
    }
}

impl<O> RetryExecutorBuilder<O> {
    /// Set the retry policy
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the observer
    ///
    /// The observer receives callbacks during retry execution.
    pub fn with_observer<O2>(self, observer: O2) -> RetryExecutorBuilder<O2> {
        RetryExecutorBuilder {
            policy: self.policy,
            observer,
            runtime: self.runtime,
        }
    }

    /// Runtime that asynchronous executors spawn onto
    ///
    /// Without one, tasks are spawned on the ambient runtime.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Build a blocking executor
    pub fn build(self) -> RetryExecutor<O> {
        RetryExecutor {
            policy: self.policy,
            observer: self.observer,
        }
    }

    /// Build a cancellable asynchronous executor
    pub fn build_async(self) -> AsyncRetryExecutor<O> {
        AsyncRetryExecutor::from_parts(self.policy, Arc::new(self.observer), self.runtime)
    }
}

/// A blocking retry executor with a fixed policy and observer
#[derive(Debug, Clone)]
pub struct RetryExecutor<O = NoOpObserver> {
    policy: RetryPolicy,
    observer: O,
}

impl RetryExecutor<NoOpObserver> {
    /// Create an executor without an observer
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            observer: NoOpObserver,
        }
    }
}

impl<O> RetryExecutor<O>
where
    O: RetryObserver,
{
    /// The policy every call through this executor uses
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute an operation with retry logic, blocking the calling thread
    ///
    /// # Arguments
    ///
    /// * `operation` - Diagnostic name embedded in the exhaustion error
    /// * `op` - One attempt at the remote call
    ///
    /// # Returns
    ///
    /// The first successful attempt's value, or [`RetryError::Exhausted`]
    /// carrying the last attempt's failure once the bound is reached. With an
    /// unbounded policy this only returns on success.
    pub fn execute<F, T, E>(&self, operation: &str, mut op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Result<T, E>,
        E: Display,
    {
        let mut state = RetryState::new(operation, &self.policy, &self.observer);

        loop {
            state.begin_attempt();
            match state.record(AttemptOutcome::from(op())) {
                Step::Done(value) => return Ok(value),
                Step::Retry => continue,
                Step::Exhausted(err) => return Err(err),
            }
        }
    }
}
