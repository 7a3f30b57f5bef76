//! Remote backend boundary
//!
//! These traits describe what the facades consume from a remote store. Calls
//! are blocking: each one is a single round trip that either returns or
//! fails. Asynchronous facade calls move them onto tokio's blocking pool.
//!
//! A backend failure is an opaque diagnostic. Facades retry every failure
//! the same way, so there is nothing to classify.

use storeguard_core::StoreRef;
use thiserror::Error;

/// Failure of a single remote call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendError {
    message: String,
}

impl BackendError {
    /// Create a backend error from a diagnostic message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The diagnostic message
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Key-value operations against a remote store
///
/// `store` selects the namespace; resolving it is the backend's job.
pub trait RemoteStore<V>: Send + Sync + 'static {
    /// Read a key
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))` if the key exists
    /// - `Ok(None)` if the key was never set
    /// - `Err(...)` on any backend failure
    fn get(&self, store: &StoreRef, key: &str) -> Result<Option<V>, BackendError>;

    /// Write a key, overwriting any existing value
    fn set(&self, store: &StoreRef, key: &str, value: &V) -> Result<(), BackendError>;

    /// Delete a key, returning the value it held, if any
    fn remove(&self, store: &StoreRef, key: &str) -> Result<Option<V>, BackendError>;
}

/// Sorted range query over an ordered store
///
/// `min_value` and `max_value` are inclusive. Paging beyond the first page
/// happens on the backend's page handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortedQuery {
    /// Sort ascending (`true`) or descending (`false`)
    pub ascending: bool,
    /// Entries per page
    pub page_size: u32,
    /// Inclusive lower bound
    pub min_value: Option<i64>,
    /// Inclusive upper bound
    pub max_value: Option<i64>,
}

impl SortedQuery {
    /// Ascending query with no value bounds
    pub fn ascending(page_size: u32) -> Self {
        Self {
            ascending: true,
            page_size,
            min_value: None,
            max_value: None,
        }
    }

    /// Descending query with no value bounds
    pub fn descending(page_size: u32) -> Self {
        Self {
            ascending: false,
            ..Self::ascending(page_size)
        }
    }

    /// Only include values `>= min`
    pub fn with_min(mut self, min: i64) -> Self {
        self.min_value = Some(min);
        self
    }

    /// Only include values `<= max`
    pub fn with_max(mut self, max: i64) -> Self {
        self.max_value = Some(max);
        self
    }

    /// Whether `value` falls inside the bounds
    pub fn contains(&self, value: i64) -> bool {
        self.min_value.map_or(true, |min| value >= min)
            && self.max_value.map_or(true, |max| value <= max)
    }
}

/// A store of numeric values that supports sorted range reads
pub trait OrderedRemoteStore: RemoteStore<i64> {
    /// Opaque page handle returned by a sorted read
    type Pages: Send + 'static;

    /// Run one sorted range query
    fn get_sorted(&self, store: &StoreRef, query: &SortedQuery) -> Result<Self::Pages, BackendError>;
}
