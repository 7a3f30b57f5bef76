//! Ordered key-value facade
//!
//! Used when values are numeric ranking scores. Adds a sorted range read on
//! top of [`KeyValueFacade`]; the backend owns pagination, and the facade
//! returns its page handle untouched.

use std::fmt;
use std::sync::Arc;

use storeguard_core::retry::{RetryError, RetryHandle};
use storeguard_core::types::StoreguardConfig;
use storeguard_core::{RetryPolicy, StoreIdentity, StoreRef};
use tokio::runtime::Handle;

use crate::backend::{BackendError, OrderedRemoteStore, SortedQuery};
use crate::facade::{operation, KeyValueFacade};

/// Facade over an ordered store of `i64` values
pub struct OrderedKeyValueFacade<B> {
    inner: KeyValueFacade<i64, B>,
}

impl<B> OrderedKeyValueFacade<B>
where
    B: OrderedRemoteStore,
{
    /// Bind a backend to a store identity
    pub fn new(backend: Arc<B>, identity: StoreIdentity) -> Self {
        Self {
            inner: KeyValueFacade::new(backend, identity),
        }
    }

    /// Bind a backend to a store declared in configuration
    pub fn from_config(
        backend: Arc<B>,
        config: &StoreguardConfig,
        name: &str,
    ) -> storeguard_core::Result<Self> {
        Ok(Self {
            inner: KeyValueFacade::from_config(backend, config, name)?,
        })
    }

    /// Spawn asynchronous calls onto `runtime` instead of the ambient one
    pub fn with_runtime(self, runtime: Handle) -> Self {
        Self {
            inner: self.inner.with_runtime(runtime),
        }
    }

    /// The plain key-value view of this store
    pub fn as_key_value(&self) -> &KeyValueFacade<i64, B> {
        &self.inner
    }

    /// Store identity
    pub fn identity(&self) -> &StoreIdentity {
        self.inner.identity()
    }

    /// Target namespace
    pub fn store(&self) -> &StoreRef {
        self.inner.store()
    }

    /// Retry policy shared by every call
    pub fn policy(&self) -> &RetryPolicy {
        self.inner.policy()
    }

    /// Read a score; see [`KeyValueFacade::get`]
    pub fn get(&self, key: &str) -> Result<Option<i64>, RetryError<BackendError>> {
        self.inner.get(key)
    }

    /// Write a score; see [`KeyValueFacade::set`]
    pub fn set(&self, key: &str, value: i64) -> Result<(), RetryError<BackendError>> {
        self.inner.set(key, &value)
    }

    /// Delete a score; see [`KeyValueFacade::remove`]
    pub fn remove(&self, key: &str) -> Result<Option<i64>, RetryError<BackendError>> {
        self.inner.remove(key)
    }

    /// Read a score on a background task
    pub fn get_async(&self, key: impl Into<String>) -> RetryHandle<Option<i64>, BackendError> {
        self.inner.get_async(key)
    }

    /// Write a score on a background task
    pub fn set_async(&self, key: impl Into<String>, value: i64) -> RetryHandle<(), BackendError> {
        self.inner.set_async(key, value)
    }

    /// Delete a score on a background task
    pub fn remove_async(&self, key: impl Into<String>) -> RetryHandle<Option<i64>, BackendError> {
        self.inner.remove_async(key)
    }

    /// Run a sorted range query, retrying failures; blocks the calling thread
    pub fn get_sorted(&self, query: SortedQuery) -> Result<B::Pages, RetryError<BackendError>> {
        let store = self.inner.identity.store();
        let backend = &self.inner.backend;
        self.inner
            .executor
            .execute(operation::GET_SORTED, || backend.get_sorted(store, &query))
    }

    /// Run a sorted range query on a background task
    ///
    /// # Panics
    ///
    /// Panics outside a tokio runtime unless one was set with
    /// [`with_runtime`](Self::with_runtime).
    pub fn get_sorted_async(&self, query: SortedQuery) -> RetryHandle<B::Pages, BackendError> {
        let backend = Arc::clone(&self.inner.backend);
        let store = self.inner.identity.store().clone();
        self.inner
            .async_executor
            .spawn_blocking(operation::GET_SORTED, move || {
                backend.get_sorted(&store, &query)
            })
    }
}

impl<B> Clone for OrderedKeyValueFacade<B> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<B> fmt::Debug for OrderedKeyValueFacade<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedKeyValueFacade")
            .field("identity", &self.inner.identity)
            .finish_non_exhaustive()
    }
}
