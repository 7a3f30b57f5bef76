//! Retry observation and logging
//!
//! This module provides the `RetryObserver` trait for monitoring retry attempts
//! and a `TracingObserver` implementation that logs using the `tracing` crate.
//! The executors themselves never log; they only report to their observer.

use std::fmt::Display;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Observer trait for retry attempt events
///
/// Implement this trait to receive callbacks during retry execution.
/// Every callback carries the diagnostic name of the operation, so one
/// observer can serve all operations of a facade.
///
/// # Example
///
/// ```rust
/// use storeguard_core::retry::RetryObserver;
/// use std::fmt::Display;
/// use std::time::Duration;
///
/// struct PrintObserver;
///
/// impl RetryObserver for PrintObserver {
///     fn on_attempt_start(&self, operation: &str, attempt: u64, _max: Option<u64>) {
///         println!("{operation}: attempt {attempt}");
///     }
///
///     fn on_attempt_failed(&self, operation: &str, attempt: u64, error: &dyn Display) {
///         println!("{operation}: attempt {attempt} failed: {error}");
///     }
///
///     fn on_success(&self, _operation: &str, _attempt: u64, _total: Duration) {}
///
///     fn on_exhausted(&self, _operation: &str, _attempts: u64, _error: &dyn Display) {}
/// }
/// ```
pub trait RetryObserver: Send + Sync {
    /// Called when an attempt is about to start
    ///
    /// # Arguments
    ///
    /// * `operation` - Diagnostic name of the operation
    /// * `attempt` - The attempt number (1-indexed)
    /// * `max_attempts` - Total attempts permitted, `None` when unbounded
    fn on_attempt_start(&self, operation: &str, attempt: u64, max_attempts: Option<u64>);

    /// Called when an attempt fails and will be retried
    ///
    /// For asynchronous calls this runs before the cancellation check that
    /// guards the next attempt.
    fn on_attempt_failed(&self, operation: &str, attempt: u64, error: &dyn Display);

    /// Called when the operation succeeds
    fn on_success(&self, operation: &str, attempt: u64, total_duration: Duration);

    /// Called when the retry bound is reached without success
    fn on_exhausted(&self, operation: &str, attempts: u64, final_error: &dyn Display);

    /// Called when an asynchronous call is cancelled
    ///
    /// `attempts` counts every attempt made, including an in-flight attempt
    /// whose result was discarded.
    fn on_cancelled(&self, operation: &str, attempts: u64) {
        let _ = (operation, attempts);
    }
}

/// A no-op observer that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl RetryObserver for NoOpObserver {
    fn on_attempt_start(&self, _operation: &str, _attempt: u64, _max_attempts: Option<u64>) {}

    fn on_attempt_failed(&self, _operation: &str, _attempt: u64, _error: &dyn Display) {}

    fn on_success(&self, _operation: &str, _attempt: u64, _total_duration: Duration) {}

    fn on_exhausted(&self, _operation: &str, _attempts: u64, _final_error: &dyn Display) {}
}

/// An observer that logs retry events using the `tracing` crate
///
/// # Log Levels
///
/// - `on_attempt_start`: DEBUG
/// - `on_attempt_failed`: WARN
/// - `on_success`: INFO (if > 1 attempt) or DEBUG (first attempt)
/// - `on_exhausted`: ERROR
/// - `on_cancelled`: WARN
#[derive(Debug, Clone)]
pub struct TracingObserver {
    /// Store the operations run against (for log context)
    store: String,
}

impl TracingObserver {
    /// Create a new tracing observer tagged with a store name
    pub fn new(store: impl Into<String>) -> Self {
        Self {
            store: store.into(),
        }
    }

    /// Get the store name
    pub fn store(&self) -> &str {
        &self.store
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new("storeguard")
    }
}

impl RetryObserver for TracingObserver {
    fn on_attempt_start(&self, operation: &str, attempt: u64, max_attempts: Option<u64>) {
        tracing::debug!(
            store = %self.store,
            operation,
            attempt,
            max_attempts,
            "starting attempt"
        );
    }

    fn on_attempt_failed(&self, operation: &str, attempt: u64, error: &dyn Display) {
        tracing::warn!(
            store = %self.store,
            operation,
            attempt,
            error = %error,
            "attempt failed, will retry"
        );
    }

    fn on_success(&self, operation: &str, attempt: u64, total_duration: Duration) {
        if attempt > 1 {
            tracing::info!(
                store = %self.store,
                operation,
                attempt,
                total_duration_ms = total_duration.as_millis() as u64,
                "succeeded after retry"
            );
        } else {
            tracing::debug!(
                store = %self.store,
                operation,
                duration_ms = total_duration.as_millis() as u64,
                "succeeded on first attempt"
            );
        }
    }

    fn on_exhausted(&self, operation: &str, attempts: u64, final_error: &dyn Display) {
        tracing::error!(
            store = %self.store,
            operation,
            attempts,
            error = %final_error,
            "all retry attempts exhausted"
        );
    }

    fn on_cancelled(&self, operation: &str, attempts: u64) {
        tracing::warn!(
            store = %self.store,
            operation,
            attempts,
            "retry cancelled"
        );
    }
}

/// An observer that collects statistics about retry attempts
///
/// Useful for testing and metrics collection.
#[derive(Debug, Default)]
pub struct StatsObserver {
    /// Attempt start events
    pub attempt_starts: AtomicU32,
    /// Failed attempt events
    pub failures: AtomicU32,
    /// Success events
    pub successes: AtomicU32,
    /// Exhaustion events
    pub exhaustions: AtomicU32,
    /// Cancellation events
    pub cancellations: AtomicU32,
}

impl StatsObserver {
    /// Create a new stats observer
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of attempt starts
    pub fn attempt_starts(&self) -> u32 {
        self.attempt_starts.load(Ordering::SeqCst)
    }

    /// Get the number of failures
    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::SeqCst)
    }

    /// Get the number of successes
    pub fn successes(&self) -> u32 {
        self.successes.load(Ordering::SeqCst)
    }

    /// Get the number of exhaustions
    pub fn exhaustions(&self) -> u32 {
        self.exhaustions.load(Ordering::SeqCst)
    }

    /// Get the number of cancellations
    pub fn cancellations(&self) -> u32 {
        self.cancellations.load(Ordering::SeqCst)
    }
}

impl RetryObserver for StatsObserver {
    fn on_attempt_start(&self, _operation: &str, _attempt: u64, _max_attempts: Option<u64>) {
        self.attempt_starts.fetch_add(1, Ordering::SeqCst);
    }

    fn on_attempt_failed(&self, _operation: &str, _attempt: u64, _error: &dyn Display) {
        self.failures.fetch_add(1, Ordering::SeqCst);
    }

    fn on_success(&self, _operation: &str, _attempt: u64, _total_duration: Duration) {
        self.successes.fetch_add(1, Ordering::SeqCst);
    }

    fn on_exhausted(&self, _operation: &str, _attempts: u64, _final_error: &dyn Display) {
        self.exhaustions.fetch_add(1, Ordering::SeqCst);
    }

    fn on_cancelled(&self, _operation: &str, _attempts: u64) {
        self.cancellations.fetch_add(1, Ordering::SeqCst);
    }
}

/// Implement RetryObserver for Arc<T> where T: RetryObserver
impl<T: RetryObserver + ?Sized> RetryObserver for std::sync::Arc<T> {
    fn on_attempt_start(&self, operation: &str, attempt: u64, max_attempts: Option<u64>) {
        (**self).on_attempt_start(operation, attempt, max_attempts)
    }

    fn on_attempt_failed(&self, operation: &str, attempt: u64, error: &dyn Display) {
        (**self).on_attempt_failed(operation, attempt, error)
    }

    fn on_success(&self, operation: &str, attempt: u64, total_duration: Duration) {
        (**self).on_success(operation, attempt, total_duration)
    }

    fn on_exhausted(&self, operation: &str, attempts: u64, final_error: &dyn Display) {
        (**self).on_exhausted(operation, attempts, final_error)
    }

    fn on_cancelled(&self, operation: &str, attempts: u64) {
        (**self).on_cancelled(operation, attempts)
    }
}

/// Implement RetryObserver for Box<T> where T: RetryObserver
impl<T: RetryObserver + ?Sized> RetryObserver for Box<T> {
    fn on_attempt_start(&self, operation: &str, attempt: u64, max_attempts: Option<u64>) {
        (**self).on_attempt_start(operation, attempt, max_attempts)
    }

    fn on_attempt_failed(&self, operation: &str, attempt: u64, error: &dyn Display) {
        (**self).on_attempt_failed(operation, attempt, error)
    }

    fn on_success(&self, operation: &str, attempt: u64, total_duration: Duration) {
        (**self).on_success(operation, attempt, total_duration)
    }

    fn on_exhausted(&self, operation: &str, attempts: u64, final_error: &dyn Display) {
        (**self).on_exhausted(operation, attempts, final_error)
    }

    fn on_cancelled(&self, operation: &str, attempts: u64) {
        (**self).on_cancelled(operation, attempts)
    }
}
