//! In-process backend
//!
//! [`MemoryStore`] implements the backend traits over a mutex-guarded map.
//! It stands in for a real remote store in tests and local development, and
//! can be told to fail upcoming calls to exercise retry paths.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use storeguard_core::StoreRef;

use crate::backend::{BackendError, OrderedRemoteStore, RemoteStore, SortedQuery};

type Namespaces<V> = HashMap<StoreRef, BTreeMap<String, V>>;

/// In-memory backend with failure injection
///
/// Scoped and unscoped stores with the same name are separate namespaces.
#[derive(Debug)]
pub struct MemoryStore<V> {
    namespaces: Mutex<Namespaces<V>>,
    injected: Mutex<VecDeque<BackendError>>,
    calls: AtomicU64,
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self {
            namespaces: Mutex::new(HashMap::new()),
            injected: Mutex::new(VecDeque::new()),
            calls: AtomicU64::new(0),
        }
    }
}

impl<V> MemoryStore<V> {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` calls with a generic message
    pub fn fail_next(&self, n: usize) {
        self.fail_next_with((0..n).map(|_| "injected backend failure"));
    }

    /// Fail the next calls with the given messages, in order
    pub fn fail_next_with<I, S>(&self, messages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut injected = self
            .injected
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        injected.extend(messages.into_iter().map(BackendError::new));
    }

    /// Number of calls received, failed ones included
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of keys in a namespace
    ///
    /// Inspection only: a lock poisoned by a panicking writer is read through.
    pub fn len(&self, store: &StoreRef) -> usize {
        self.namespaces
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(store)
            .map_or(0, BTreeMap::len)
    }

    /// Whether a namespace holds no keys
    pub fn is_empty(&self, store: &StoreRef) -> bool {
        self.len(store) == 0
    }

    /// Count the call, then fail it if a failure is queued
    fn begin_call(&self) -> Result<MutexGuard<'_, Namespaces<V>>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let next_failure = self
            .injected
            .lock()
            .map_err(|_| BackendError::new("memory store failure queue poisoned"))?
            .pop_front();
        if let Some(err) = next_failure {
            return Err(err);
        }

        self.namespaces
            .lock()
            .map_err(|_| BackendError::new("memory store poisoned"))
    }
}

impl<V> RemoteStore<V> for MemoryStore<V>
where
    V: Clone + Send + 'static,
{
    fn get(&self, store: &StoreRef, key: &str) -> Result<Option<V>, BackendError> {
        let namespaces = self.begin_call()?;
        Ok(namespaces.get(store).and_then(|ns| ns.get(key)).cloned())
    }

    fn set(&self, store: &StoreRef, key: &str, value: &V) -> Result<(), BackendError> {
        let mut namespaces = self.begin_call()?;
        namespaces
            .entry(store.clone())
            .or_default()
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    fn remove(&self, store: &StoreRef, key: &str) -> Result<Option<V>, BackendError> {
        let mut namespaces = self.begin_call()?;
        Ok(namespaces.get_mut(store).and_then(|ns| ns.remove(key)))
    }
}

impl OrderedRemoteStore for MemoryStore<i64> {
    type Pages = MemoryPages;

    fn get_sorted(&self, store: &StoreRef, query: &SortedQuery) -> Result<MemoryPages, BackendError> {
        let namespaces = self.begin_call()?;
        if query.page_size == 0 {
            return Err(BackendError::new("page size must be greater than zero"));
        }

        let mut entries: Vec<SortedEntry> = namespaces
            .get(store)
            .into_iter()
            .flatten()
            .filter(|(_, value)| query.contains(**value))
            .map(|(key, value)| SortedEntry {
                key: key.clone(),
                value: *value,
            })
            .collect();

        entries.sort_by(|a, b| a.value.cmp(&b.value).then_with(|| a.key.cmp(&b.key)));
        if !query.ascending {
            entries.reverse();
        }

        Ok(MemoryPages::new(entries, query.page_size as usize))
    }
}

/// One entry of a sorted read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedEntry {
    /// Key the value is stored under
    pub key: String,
    /// The stored value the entries are ordered by
    pub value: i64,
}

/// Page cursor over the result of a sorted read
///
/// The snapshot is taken when the query runs; later writes are not visible.
#[derive(Debug, Clone)]
pub struct MemoryPages {
    pages: Vec<Vec<SortedEntry>>,
    index: usize,
}

impl MemoryPages {
    fn new(entries: Vec<SortedEntry>, page_size: usize) -> Self {
        let pages = entries
            .chunks(page_size)
            .map(<[SortedEntry]>::to_vec)
            .collect();
        Self { pages, index: 0 }
    }

    /// Entries on the current page (empty when the query matched nothing)
    pub fn current_page(&self) -> &[SortedEntry] {
        self.pages
            .get(self.index)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether the current page is the last one
    pub fn is_finished(&self) -> bool {
        self.index + 1 >= self.pages.len()
    }

    /// Move to the next page; returns `false` if already on the last one
    pub fn advance_to_next_page(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Total number of pages
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}
