//! Bounded retry execution engine
//!
//! This module re-issues failed remote calls until one succeeds or the
//! policy's bound is reached. It offers a blocking executor and a
//! cancellable asynchronous one built on the same attempt state machine.
//!
//! # Features
//!
//! - Explicit [`AttemptOutcome`] per attempt; no failure escapes the loop
//! - Back-to-back attempts, no backoff delay
//! - Every failure is retried; the cause is never inspected
//! - Cancellation between attempts via `tokio_util` cancellation tokens
//! - Observable retry attempts via the `RetryObserver` trait
//!
//! # Example
//!
//! ```rust
//! use storeguard_core::retry::{AsyncRetryExecutor, Settlement};
//! use storeguard_core::types::RetryPolicy;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let executor = AsyncRetryExecutor::new(RetryPolicy::bounded(3));
//!
//! let handle = executor.spawn("read", || async { Ok::<_, String>(42) });
//!
//! match handle.await {
//!     Settlement::Fulfilled(value) => assert_eq!(value, 42),
//!     other => panic!("unexpected settlement: {:?}", other),
//! }
//! # });
//! ```

mod async_executor;
mod error;
mod executor;
mod observer;
mod outcome;

pub use async_executor::{AsyncRetryExecutor, RetryHandle, Settlement};
pub use error::RetryError;
pub use executor::{retry_blocking, RetryExecutor, RetryExecutorBuilder};
pub use observer::{NoOpObserver, RetryObserver, StatsObserver, TracingObserver};
pub use outcome::AttemptOutcome;
