//! Retrying key-value facade
//!
//! Each facade call hands the executors a closure that performs exactly one
//! remote call of the matching kind. The facade itself neither retries nor
//! transforms values.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use storeguard_core::retry::{
    AsyncRetryExecutor, RetryError, RetryExecutor, RetryExecutorBuilder, RetryHandle,
    TracingObserver,
};
use storeguard_core::types::StoreguardConfig;
use storeguard_core::{RetryPolicy, StoreIdentity, StoreRef};
use tokio::runtime::Handle;

use crate::backend::{BackendError, RemoteStore};

/// Diagnostic operation names
pub mod operation {
    /// Name used for `get` calls
    pub const GET: &str = "KeyValueFacade::get";
    /// Name used for `set` calls
    pub const SET: &str = "KeyValueFacade::set";
    /// Name used for `remove` calls
    pub const REMOVE: &str = "KeyValueFacade::remove";
    /// Name used for `get_sorted` calls
    pub const GET_SORTED: &str = "OrderedKeyValueFacade::get_sorted";
}

/// Key-value facade bound to one store identity
///
/// Cheap to clone; clones share the backend and identity.
pub struct KeyValueFacade<V, B> {
    pub(crate) backend: Arc<B>,
    pub(crate) identity: StoreIdentity,
    pub(crate) executor: RetryExecutor<TracingObserver>,
    pub(crate) async_executor: AsyncRetryExecutor<TracingObserver>,
    _value: PhantomData<fn() -> V>,
}

impl<V, B> KeyValueFacade<V, B>
where
    B: RemoteStore<V>,
    V: Send + 'static,
{
    /// Bind a backend to a store identity
    pub fn new(backend: Arc<B>, identity: StoreIdentity) -> Self {
        let builder = || {
            RetryExecutorBuilder::new()
                .with_policy(*identity.policy())
                .with_observer(TracingObserver::new(identity.store().to_string()))
        };
        let executor = builder().build();
        let async_executor = builder().build_async();

        tracing::debug!(
            store = %identity.store(),
            max_retries = %identity.max_retries(),
            "Bound key-value facade"
        );

        Self {
            backend,
            identity,
            executor,
            async_executor,
            _value: PhantomData,
        }
    }

    /// Bind a backend to a store declared in configuration
    pub fn from_config(
        backend: Arc<B>,
        config: &StoreguardConfig,
        name: &str,
    ) -> storeguard_core::Result<Self> {
        Ok(Self::new(backend, config.identity(name)?))
    }

    /// Spawn asynchronous calls onto `runtime` instead of the ambient one
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.async_executor = RetryExecutorBuilder::new()
            .with_policy(*self.identity.policy())
            .with_observer(TracingObserver::new(self.identity.store().to_string()))
            .with_runtime(runtime)
            .build_async();
        self
    }

    /// Store identity
    pub fn identity(&self) -> &StoreIdentity {
        &self.identity
    }

    /// Target namespace
    pub fn store(&self) -> &StoreRef {
        self.identity.store()
    }

    /// Retry policy shared by every call
    pub fn policy(&self) -> &RetryPolicy {
        self.identity.policy()
    }

    /// Read a key, retrying failures; blocks the calling thread
    ///
    /// `Ok(None)` means the key was never set. That is an answer, not a
    /// failure, so it is returned after a single attempt.
    pub fn get(&self, key: &str) -> Result<Option<V>, RetryError<BackendError>> {
        let store = self.identity.store();
        self.executor
            .execute(operation::GET, || self.backend.get(store, key))
    }

    /// Write a key, retrying failures; blocks the calling thread
    pub fn set(&self, key: &str, value: &V) -> Result<(), RetryError<BackendError>> {
        let store = self.identity.store();
        self.executor
            .execute(operation::SET, || self.backend.set(store, key, value))
    }

    /// Delete a key, retrying failures; blocks the calling thread
    ///
    /// Returns the value the key held, if any.
    pub fn remove(&self, key: &str) -> Result<Option<V>, RetryError<BackendError>> {
        let store = self.identity.store();
        self.executor
            .execute(operation::REMOVE, || self.backend.remove(store, key))
    }

    /// Read a key on a background task
    ///
    /// # Panics
    ///
    /// Panics outside a tokio runtime unless one was set with
    /// [`with_runtime`](Self::with_runtime).
    pub fn get_async(&self, key: impl Into<String>) -> RetryHandle<Option<V>, BackendError> {
        let backend = Arc::clone(&self.backend);
        let store = self.identity.store().clone();
        let key = key.into();
        self.async_executor
            .spawn_blocking(operation::GET, move || backend.get(&store, &key))
    }

    /// Write a key on a background task
    ///
    /// # Panics
    ///
    /// Panics outside a tokio runtime unless one was set with
    /// [`with_runtime`](Self::with_runtime).
    pub fn set_async(&self, key: impl Into<String>, value: V) -> RetryHandle<(), BackendError> {
        let backend = Arc::clone(&self.backend);
        let store = self.identity.store().clone();
        let key = key.into();
        self.async_executor
            .spawn_blocking(operation::SET, move || backend.set(&store, &key, &value))
    }

    /// Delete a key on a background task
    ///
    /// # Panics
    ///
    /// Panics outside a tokio runtime unless one was set with
    /// [`with_runtime`](Self::with_runtime).
    pub fn remove_async(&self, key: impl Into<String>) -> RetryHandle<Option<V>, BackendError> {
        let backend = Arc::clone(&self.backend);
        let store = self.identity.store().clone();
        let key = key.into();
        self.async_executor
            .spawn_blocking(operation::REMOVE, move || backend.remove(&store, &key))
    }
}

impl<V, B> Clone for KeyValueFacade<V, B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            identity: self.identity.clone(),
            executor: self.executor.clone(),
            async_executor: self.async_executor.clone(),
            _value: PhantomData,
        }
    }
}

impl<V, B> fmt::Debug for KeyValueFacade<V, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyValueFacade")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}
