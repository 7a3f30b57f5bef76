//! # storeguard-core
//!
//! Core library for storeguard providing:
//! - Bounded retry execution, blocking and cancellable asynchronous
//! - Retry policy and store identity types
//! - Configuration file loading (storeguard.yaml)

pub mod config;
pub mod error;
pub mod retry;
pub mod types;

pub use config::ConfigLoader;
pub use error::{Error, Result};
pub use types::{MaxRetries, RetryPolicy, StoreIdentity, StoreRef};
