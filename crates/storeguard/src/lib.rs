//! # storeguard
//!
//! Retrying facades for remote, rate-limited key-value stores.
//!
//! A facade binds a store identity (name, optional scope, retry bound) to the
//! retry executors from `storeguard-core` and exposes get/set/remove, each in
//! a blocking form and a cancellable asynchronous form. The ordered variant
//! adds a sorted, paginated range read over numeric values.
//!
//! Facades hold no values between calls; every call goes to the backend.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use storeguard::{KeyValueFacade, MemoryStore};
//! use storeguard_core::StoreIdentity;
//!
//! let backend = Arc::new(MemoryStore::<String>::new());
//! let identity = StoreIdentity::new("PlayerData").unwrap().with_max_retries(3);
//! let players = KeyValueFacade::new(backend, identity);
//!
//! players.set("player_1", &"level 4".to_string()).unwrap();
//! assert_eq!(players.get("player_1").unwrap().as_deref(), Some("level 4"));
//! assert_eq!(players.get("player_2").unwrap(), None);
//! ```

pub mod backend;
pub mod facade;
pub mod memory;
pub mod ordered;

pub use backend::{BackendError, OrderedRemoteStore, RemoteStore, SortedQuery};
pub use facade::KeyValueFacade;
pub use memory::{MemoryPages, MemoryStore, SortedEntry};
pub use ordered::OrderedKeyValueFacade;

pub use storeguard_core::retry::{RetryError, RetryHandle, Settlement};
