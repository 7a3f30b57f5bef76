//! Attempt outcomes and per-call retry state
//!
//! Every attempt's `Result` is captured as an [`AttemptOutcome`] and fed to a
//! [`RetryState`], which decides the next [`Step`]. Both executors drive the
//! same state machine; they differ only in how an attempt is invoked and
//! whether a cancellation token is consulted between attempts.

use std::fmt::Display;
use std::time::Instant;

use crate::types::RetryPolicy;

use super::error::RetryError;
use super::observer::RetryObserver;

/// Outcome of a single attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome<T, E> {
    /// The remote call returned a value
    Success(T),
    /// The remote call failed; the error is an opaque diagnostic
    Failure(E),
}

impl<T, E> AttemptOutcome<T, E> {
    /// Check if the attempt succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success(_))
    }

    /// Convert back into a `Result`
    pub fn into_result(self) -> Result<T, E> {
        match self {
            AttemptOutcome::Success(value) => Ok(value),
            AttemptOutcome::Failure(err) => Err(err),
        }
    }
}

impl<T, E> From<Result<T, E>> for AttemptOutcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => AttemptOutcome::Success(value),
            Err(err) => AttemptOutcome::Failure(err),
        }
    }
}

/// What the loop does after recording an outcome
#[derive(Debug)]
pub(crate) enum Step<T, E> {
    /// Return this value; no further attempts
    Done(T),
    /// Issue another attempt
    Retry,
    /// Bound reached; settle with this failure
    Exhausted(RetryError<E>),
}

/// State owned by one in-flight call
///
/// Created fresh per call and dropped when the call terminates.
pub(crate) struct RetryState<'a, O: ?Sized> {
    operation: &'a str,
    policy: &'a RetryPolicy,
    observer: &'a O,
    attempts_made: u64,
    started: Instant,
}

impl<'a, O> RetryState<'a, O>
where
    O: RetryObserver + ?Sized,
{
    pub(crate) fn new(operation: &'a str, policy: &'a RetryPolicy, observer: &'a O) -> Self {
        Self {
            operation,
            policy,
            observer,
            attempts_made: 0,
            started: Instant::now(),
        }
    }

    #[cfg(test)]
    pub(crate) fn attempts_made(&self) -> u64 {
        self.attempts_made
    }

    /// Announce the attempt about to be issued
    pub(crate) fn begin_attempt(&self) {
        self.observer.on_attempt_start(
            self.operation,
            self.attempts_made.saturating_add(1),
            self.policy.max_attempts(),
        );
    }

    /// Record a completed attempt and decide what happens next
    pub(crate) fn record<T, E: Display>(&mut self, outcome: AttemptOutcome<T, E>) -> Step<T, E> {
        self.attempts_made = self.attempts_made.saturating_add(1);

        match outcome {
            AttemptOutcome::Success(value) => {
                self.observer
                    .on_success(self.operation, self.attempts_made, self.started.elapsed());
                Step::Done(value)
            }
            AttemptOutcome::Failure(err) if self.policy.allows_retry(self.attempts_made) => {
                self.observer
                    .on_attempt_failed(self.operation, self.attempts_made, &err);
                Step::Retry
            }
            AttemptOutcome::Failure(err) => {
                self.observer
                    .on_exhausted(self.operation, self.attempts_made, &err);
                Step::Exhausted(RetryError::exhausted(
                    self.operation,
                    self.attempts_made,
                    err,
                    self.started.elapsed(),
                ))
            }
        }
    }

    /// Cancellation observed before the next attempt was issued
    pub(crate) fn cancel(&self) {
        self.observer.on_cancelled(self.operation, self.attempts_made);
    }

    /// Cancellation observed while an attempt was in flight
    ///
    /// The attempt counts as made, but its outcome is dropped unseen.
    pub(crate) fn abandon<T, E>(&mut self, _outcome: AttemptOutcome<T, E>) {
        self.attempts_made = self.attempts_made.saturating_add(1);
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::observer::StatsObserver;

    #[test]
    fn test_outcome_from_result() {
        let ok: AttemptOutcome<u32, String> = Ok(7).into();
        assert!(ok.is_success());
        assert_eq!(ok.into_result(), Ok(7));

        let err: AttemptOutcome<u32, String> = Err("throttled".to_string()).into();
        assert!(!err.is_success());
        assert_eq!(err.into_result(), Err("throttled".to_string()));
    }

    #[test]
    fn test_state_retries_until_bound() {
        let policy = RetryPolicy::bounded(1);
        let observer = StatsObserver::new();
        let mut state = RetryState::new("op", &policy, &observer);

        let step = state.record::<(), _>(AttemptOutcome::Failure("first"));
        assert!(matches!(step, Step::Retry));

        let step = state.record::<(), _>(AttemptOutcome::Failure("second"));
        match step {
            Step::Exhausted(err) => {
                assert_eq!(err.attempts(), Some(2));
                assert_eq!(err.into_source(), Some("second"));
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
        assert_eq!(state.attempts_made(), 2);
        assert_eq!(observer.failures(), 1);
        assert_eq!(observer.exhaustions(), 1);
    }

    #[test]
    fn test_state_stops_on_success() {
        let policy = RetryPolicy::unbounded();
        let observer = StatsObserver::new();
        let mut state = RetryState::new("op", &policy, &observer);

        assert!(matches!(
            state.record::<_, &str>(AttemptOutcome::Success("ok")),
            Step::Done("ok")
        ));
        assert_eq!(state.attempts_made(), 1);
        assert_eq!(observer.successes(), 1);
    }

    #[test]
    fn test_abandon_counts_attempt() {
        let policy = RetryPolicy::unbounded();
        let observer = StatsObserver::new();
        let mut state = RetryState::new("op", &policy, &observer);

        state.abandon::<&str, &str>(AttemptOutcome::Success("late"));
        assert_eq!(state.attempts_made(), 1);
        assert_eq!(observer.cancellations(), 1);
        assert_eq!(observer.successes(), 0);
    }

    #[test]
    fn test_largest_bound_exhausts_on_final_attempt() {
        let policy = RetryPolicy::bounded(u32::MAX);
        let observer = StatsObserver::new();
        let mut state = RetryState::new("op", &policy, &observer);
        state.attempts_made = u64::from(u32::MAX);

        match state.record::<(), _>(AttemptOutcome::Failure("throttled")) {
            Step::Exhausted(err) => assert_eq!(err.attempts(), Some(u64::from(u32::MAX) + 1)),
            other => panic!("expected exhaustion, got {:?}", other),
        }
        assert_eq!(observer.exhaustions(), 1);
    }
}
