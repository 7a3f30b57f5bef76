//! Facade behavior against a mocked backend

mod common;

use std::sync::Arc;

use common::*;
use mockall::{mock, predicate::eq, Sequence};
use storeguard::{BackendError, KeyValueFacade, RemoteStore};
use storeguard_core::StoreRef;

mock! {
    pub Backend {}

    impl RemoteStore<String> for Backend {
        fn get(&self, store: &StoreRef, key: &str) -> Result<Option<String>, BackendError>;
        fn set(&self, store: &StoreRef, key: &str, value: &String) -> Result<(), BackendError>;
        fn remove(&self, store: &StoreRef, key: &str) -> Result<Option<String>, BackendError>;
    }
}

fn facade(backend: MockBackend, max_retries: u32) -> KeyValueFacade<String, MockBackend> {
    init_tracing();
    KeyValueFacade::new(
        Arc::new(backend),
        identity(PLAYER_STORE, max_retries).with_scope("europe"),
    )
}

#[test]
fn test_get_absent_calls_backend_once() {
    let mut backend = MockBackend::new();
    backend
        .expect_get()
        .withf(|store, key| store.name() == PLAYER_STORE && store.scope() == Some("europe") && key == "player_1")
        .times(1)
        .returning(|_, _| Ok(None));

    assert_eq!(facade(backend, 5).get("player_1").unwrap(), None);
}

#[test]
fn test_set_passes_value_and_retries_alternating_causes() {
    let mut backend = MockBackend::new();
    let mut seq = Sequence::new();
    for cause in ["throttled", "unavailable"] {
        backend
            .expect_set()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _, _| Err(BackendError::new(cause)));
    }
    backend
        .expect_set()
        .with(mockall::predicate::always(), eq("player_1"), eq("level 4".to_string()))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(()));

    facade(backend, 2)
        .set("player_1", &"level 4".to_string())
        .unwrap();
}

#[test]
fn test_remove_exhaustion_carries_last_cause() {
    let mut backend = MockBackend::new();
    let mut seq = Sequence::new();
    for cause in ["throttled", "unavailable"] {
        backend
            .expect_remove()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _| Err(BackendError::new(cause)));
    }

    let err = facade(backend, 1).remove("player_1").unwrap_err();
    assert_eq!(err.attempts(), Some(2));
    assert_eq!(err.into_source(), Some(BackendError::new("unavailable")));
}

#[tokio::test]
async fn test_async_get_success_on_first_attempt() {
    let mut backend = MockBackend::new();
    backend
        .expect_get()
        .times(1)
        .returning(|_, _| Ok(Some("level 4".to_string())));

    let settlement = facade(backend, 3).get_async("player_1").await;
    assert_eq!(settlement.fulfilled(), Some(Some("level 4".to_string())));
}
