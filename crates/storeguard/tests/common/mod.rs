//! Shared fixtures for storeguard integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{mpsc, Arc, Mutex};

use storeguard::{BackendError, KeyValueFacade, MemoryStore, RemoteStore};
use storeguard_core::{StoreIdentity, StoreRef};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

pub const PLAYER_STORE: &str = "PlayerData";
pub const LEADERBOARD_STORE: &str = "Leaderboard";

/// Route tracing output through the test harness; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn identity(name: &str, max_retries: u32) -> StoreIdentity {
    StoreIdentity::new(name)
        .expect("valid store name")
        .with_max_retries(max_retries)
}

/// A string facade over a fresh memory store
pub fn memory_facade(
    max_retries: u32,
) -> (
    Arc<MemoryStore<String>>,
    KeyValueFacade<String, MemoryStore<String>>,
) {
    init_tracing();
    let backend = Arc::new(MemoryStore::new());
    let facade = KeyValueFacade::new(Arc::clone(&backend), identity(PLAYER_STORE, max_retries));
    (backend, facade)
}

/// Backend whose calls always fail, pausing inside one chosen call
///
/// When call number `hold_on` starts, it reports on the `entered` channel
/// and blocks until the test releases it.
pub struct GatedStore {
    calls: AtomicU32,
    hold_on: u32,
    entered: UnboundedSender<u32>,
    release: Mutex<mpsc::Receiver<()>>,
}

pub struct Gate {
    pub entered: UnboundedReceiver<u32>,
    pub release: mpsc::Sender<()>,
}

impl GatedStore {
    pub fn new(hold_on: u32) -> (Arc<Self>, Gate) {
        let (entered_tx, entered_rx) = unbounded_channel();
        let (release_tx, release_rx) = mpsc::channel();
        let store = Arc::new(Self {
            calls: AtomicU32::new(0),
            hold_on,
            entered: entered_tx,
            release: Mutex::new(release_rx),
        });
        let gate = Gate {
            entered: entered_rx,
            release: release_tx,
        };
        (store, gate)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn call(&self) -> Result<Option<String>, BackendError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n == self.hold_on {
            let _ = self.entered.send(n);
            let _ = self.release.lock().expect("gate lock").recv();
        }
        Err(BackendError::new(format!("throttled on call {}", n)))
    }
}

impl RemoteStore<String> for GatedStore {
    fn get(&self, _store: &StoreRef, _key: &str) -> Result<Option<String>, BackendError> {
        self.call()
    }

    fn set(&self, _store: &StoreRef, _key: &str, _value: &String) -> Result<(), BackendError> {
        self.call().map(|_| ())
    }

    fn remove(&self, _store: &StoreRef, _key: &str) -> Result<Option<String>, BackendError> {
        self.call()
    }
}
