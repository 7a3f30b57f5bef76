//! Integration tests for OrderedKeyValueFacade

mod common;

use std::sync::Arc;

use common::*;
use storeguard::{MemoryStore, OrderedKeyValueFacade, SortedQuery};

fn leaderboard(max_retries: u32) -> (Arc<MemoryStore<i64>>, OrderedKeyValueFacade<MemoryStore<i64>>) {
    init_tracing();
    let backend = Arc::new(MemoryStore::new());
    let facade = OrderedKeyValueFacade::new(
        Arc::clone(&backend),
        identity(LEADERBOARD_STORE, max_retries).with_scope("season_3"),
    );
    for (player, score) in [("ana", 310), ("ben", 120), ("cy", 560), ("dee", 75), ("eli", 310)] {
        facade.set(player, score).unwrap();
    }
    (backend, facade)
}

#[test]
fn test_top_scores_paginate_descending() {
    let (_, facade) = leaderboard(0);
    let mut pages = facade.get_sorted(SortedQuery::descending(2)).unwrap();

    let mut seen = Vec::new();
    loop {
        seen.extend(pages.current_page().iter().map(|e| (e.key.clone(), e.value)));
        if !pages.advance_to_next_page() {
            break;
        }
    }

    let expected: Vec<(String, i64)> = [("cy", 560), ("eli", 310), ("ana", 310), ("ben", 120), ("dee", 75)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    assert_eq!(seen, expected);
}

#[test]
fn test_range_query_ascending() {
    let (_, facade) = leaderboard(0);
    let query = SortedQuery::ascending(10).with_min(100).with_max(310);
    let pages = facade.get_sorted(query).unwrap();

    let values: Vec<_> = pages.current_page().iter().map(|e| e.value).collect();
    assert_eq!(values, vec![120, 310, 310]);
    assert!(pages.is_finished());
}

#[test]
fn test_get_sorted_recovers_from_failures() {
    let (backend, facade) = leaderboard(2);
    let before = backend.calls();
    backend.fail_next_with(["throttled", "throttled"]);

    let pages = facade.get_sorted(SortedQuery::descending(1)).unwrap();
    assert_eq!(pages.current_page()[0].key, "cy");
    assert_eq!(backend.calls() - before, 3);
}

#[test]
fn test_invalid_page_size_exhausts_retries() {
    let (backend, facade) = leaderboard(1);
    let before = backend.calls();

    let err = facade.get_sorted(SortedQuery::ascending(0)).unwrap_err();
    assert_eq!(err.attempts(), Some(2));
    assert!(err.to_string().contains("OrderedKeyValueFacade::get_sorted"));
    assert_eq!(backend.calls() - before, 2);
}

#[test]
fn test_other_scope_is_empty() {
    let (backend, _) = leaderboard(0);
    let other = OrderedKeyValueFacade::new(backend, identity(LEADERBOARD_STORE, 0));

    let pages = other.get_sorted(SortedQuery::descending(5)).unwrap();
    assert!(pages.current_page().is_empty());
}

#[tokio::test]
async fn test_get_sorted_async() {
    let (backend, facade) = leaderboard(3);
    backend.fail_next(1);

    let pages = facade
        .get_sorted_async(SortedQuery::descending(3))
        .await
        .fulfilled()
        .expect("fulfilled");
    let keys: Vec<_> = pages.current_page().iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["cy", "eli", "ana"]);
    assert!(!pages.is_finished());
}

#[tokio::test]
async fn test_score_updates_async() {
    let (_, facade) = leaderboard(0);

    assert!(facade.set_async("ben", 900).await.is_fulfilled());
    assert_eq!(facade.get_async("ben").await.fulfilled(), Some(Some(900)));
    assert_eq!(facade.remove_async("dee").await.fulfilled(), Some(Some(75)));
    assert_eq!(facade.get("dee").unwrap(), None);
}
