//! Store identity types
//!
//! A [`StoreRef`] names the remote namespace a call targets. A
//! [`StoreIdentity`] pairs it with the retry bound for every call made
//! through one facade.

use std::fmt;

use crate::error::{Error, Result};
use crate::types::{MaxRetries, RetryPolicy};

/// Remote namespace: store name plus optional scope
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreRef {
    name: String,
    scope: Option<String>,
}

impl StoreRef {
    /// Create a reference to an unscoped store
    ///
    /// Fails if `name` is empty.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::EmptyStoreName);
        }
        Ok(Self { name, scope: None })
    }

    /// Select a scope within the store
    ///
    /// An empty scope selects the unscoped store.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        let scope = scope.into();
        self.scope = (!scope.is_empty()).then_some(scope);
        self
    }

    /// Store name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scope, if any
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }
}

impl fmt::Display for StoreRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}/{}", self.name, scope),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Facade identity: namespace and retry bound, fixed for the facade's lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreIdentity {
    store: StoreRef,
    policy: RetryPolicy,
}

impl StoreIdentity {
    /// Create an identity for an unscoped store with unbounded retries
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Ok(Self {
            store: StoreRef::new(name)?,
            policy: RetryPolicy::default(),
        })
    }

    /// Select a scope within the store
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.store = self.store.with_scope(scope);
        self
    }

    /// Set the retry bound
    pub fn with_max_retries(mut self, max_retries: impl Into<MaxRetries>) -> Self {
        self.policy = RetryPolicy::new(max_retries.into());
        self
    }

    /// Target namespace
    pub fn store(&self) -> &StoreRef {
        &self.store
    }

    /// Retry policy shared by every call through this identity
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Retry bound
    pub fn max_retries(&self) -> MaxRetries {
        self.policy.max_retries
    }
}
