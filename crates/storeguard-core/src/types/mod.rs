//! Type definitions for storeguard

pub mod config_types;
pub mod retry_policy;
pub mod store;

pub use config_types::{StoreConfig, StoreguardConfig};
pub use retry_policy::{MaxRetries, RetryPolicy};
pub use store::{StoreIdentity, StoreRef};
