//! Error types for the retry execution engine
//!
//! Cancellation is not an error: a cancelled asynchronous call settles to
//! [`Settlement::Canceled`](super::Settlement::Canceled).

use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Errors that end a retried call
///
/// The error type is generic over `E`, the failure type of a single attempt.
#[derive(Debug)]
pub enum RetryError<E> {
    /// The retry bound was reached without a successful attempt
    Exhausted {
        /// Diagnostic name of the operation
        operation: String,
        /// Number of attempts made before giving up
        attempts: u64,
        /// The failure from the final attempt
        source: E,
        /// Total duration spent across all attempts
        total_duration: Duration,
    },

    /// The task driving an asynchronous call died before settling
    ///
    /// Produced when the operation panics inside the retry task.
    Aborted {
        /// Diagnostic name of the operation
        operation: String,
        /// Panic payload or runtime message
        reason: String,
    },
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Exhausted {
                operation,
                attempts,
                source,
                total_duration,
            } => {
                write!(
                    f,
                    "{} failed after {} attempts over {:.2}s: {}",
                    operation,
                    attempts,
                    total_duration.as_secs_f64(),
                    source
                )
            }
            RetryError::Aborted { operation, reason } => {
                write!(f, "{} aborted: {}", operation, reason)
            }
        }
    }
}

impl<E: Error + 'static> Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::Aborted { .. } => None,
        }
    }
}

impl<E> RetryError<E> {
    /// Create a new exhausted error
    pub fn exhausted(
        operation: impl Into<String>,
        attempts: u64,
        source: E,
        total_duration: Duration,
    ) -> Self {
        RetryError::Exhausted {
            operation: operation.into(),
            attempts,
            source,
            total_duration,
        }
    }

    /// Create a new aborted error
    pub fn aborted(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        RetryError::Aborted {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Name of the operation that failed
    pub fn operation(&self) -> &str {
        match self {
            RetryError::Exhausted { operation, .. } => operation,
            RetryError::Aborted { operation, .. } => operation,
        }
    }

    /// Number of attempts made, when known
    pub fn attempts(&self) -> Option<u64> {
        match self {
            RetryError::Exhausted { attempts, .. } => Some(*attempts),
            RetryError::Aborted { .. } => None,
        }
    }

    /// Check if this error indicates all retries were exhausted
    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }

    /// Check if the retry task aborted
    pub fn is_aborted(&self) -> bool {
        matches!(self, RetryError::Aborted { .. })
    }

    /// Get the last attempt's failure, consuming this error
    pub fn into_source(self) -> Option<E> {
        match self {
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::Aborted { .. } => None,
        }
    }

    /// Get a reference to the last attempt's failure
    pub fn source_ref(&self) -> Option<&E> {
        match self {
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::Aborted { .. } => None,
        }
    }

    /// Map the error type using a closure
    pub fn map_err<F, E2>(self, f: F) -> RetryError<E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            RetryError::Exhausted {
                operation,
                attempts,
                source,
                total_duration,
            } => RetryError::Exhausted {
                operation,
                attempts,
                source: f(source),
                total_duration,
            },
            RetryError::Aborted { operation, reason } => RetryError::Aborted { operation, reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_exhausted_error() {
        let err: RetryError<io::Error> = RetryError::exhausted(
            "KeyValueFacade::get",
            3,
            io::Error::new(io::ErrorKind::TimedOut, "timeout"),
            Duration::from_secs(5),
        );

        assert!(err.is_exhausted());
        assert!(!err.is_aborted());
        assert_eq!(err.attempts(), Some(3));
        assert_eq!(err.operation(), "KeyValueFacade::get");
    }

    #[test]
    fn test_aborted_error() {
        let err: RetryError<io::Error> = RetryError::aborted("KeyValueFacade::set", "boom");

        assert!(err.is_aborted());
        assert_eq!(err.attempts(), None);
        assert!(err.source_ref().is_none());
        assert_eq!(err.to_string(), "KeyValueFacade::set aborted: boom");
    }

    #[test]
    fn test_into_source() {
        let err: RetryError<String> = RetryError::exhausted(
            "op",
            3,
            "original error".to_string(),
            Duration::from_secs(1),
        );

        assert_eq!(err.into_source(), Some("original error".to_string()));
    }

    #[test]
    fn test_map_err() {
        let err: RetryError<i32> = RetryError::exhausted("op", 3, 42, Duration::from_secs(1));

        let mapped = err.map_err(|n| format!("error code: {}", n));
        assert!(
            matches!(mapped, RetryError::Exhausted { source, .. } if source == "error code: 42")
        );
    }

    #[test]
    fn test_display_embeds_operation_and_detail() {
        let err: RetryError<io::Error> = RetryError::exhausted(
            "KeyValueFacade::remove",
            3,
            io::Error::new(io::ErrorKind::TimedOut, "request throttled"),
            Duration::from_secs(5),
        );

        let display = format!("{}", err);
        assert!(display.contains("KeyValueFacade::remove"));
        assert!(display.contains("3 attempts"));
        assert!(display.contains("request throttled"));
    }

    #[test]
    fn test_error_source_chain() {
        let err: RetryError<io::Error> = RetryError::exhausted(
            "op",
            1,
            io::Error::other("inner"),
            Duration::ZERO,
        );
        assert_eq!(Error::source(&err).unwrap().to_string(), "inner");
    }
}
