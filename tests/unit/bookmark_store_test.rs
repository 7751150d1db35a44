//! Unit tests for the BookmarkStore public API.
//!
//! The store is driven through a scripted remote so every failure path and
//! every remote call can be observed.

#[path = "../common/mod.rs"]
mod common;

use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use rstest::rstest;

use common::ScriptedRemote;
use rxportal::managers::bookmark_store::BookmarkStore;
use rxportal::managers::profile_selector::ProfileSelector;
use rxportal::services::remote_store::RemoteStore;
use rxportal::types::bookmark::ToggleOutcome;
use rxportal::types::errors::{BookmarkError, INVALID_RESOURCE_ID_MESSAGE, NO_ACTIVE_PROFILE_MESSAGE};
use rxportal::types::profile::Profile;

fn setup() -> (Arc<ScriptedRemote>, ProfileSelector, Arc<BookmarkStore>) {
    let remote = ScriptedRemote::new();
    let selector = ProfileSelector::new();
    let dyn_remote: Arc<dyn RemoteStore> = remote.clone();
    let store = Arc::new(BookmarkStore::new(dyn_remote, selector.subscribe()));
    (remote, selector, store)
}

fn ids(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Set/list coherence: the id set is exactly the records' resource ids.
fn assert_coherent(store: &BookmarkStore) {
    let from_records: HashSet<String> = store.bookmarks().iter().map(|r| r.resource_id.clone()).collect();
    assert_eq!(store.bookmarked_file_ids(), from_records);
    assert_eq!(from_records.len(), store.bookmarks().len(), "duplicate records for one resource");
}

/// Scenario A state: profile p1 active with f1 (newest) and f2.
async fn scenario_a() -> (Arc<ScriptedRemote>, ProfileSelector, Arc<BookmarkStore>) {
    let (remote, selector, store) = setup();
    remote.add_catalog_file("f1", "Hypertension Protocol.pdf");
    remote.add_catalog_file("f2", "Inhaler Technique.mp4");
    remote.seed_bookmark("b2", "p1", "f2");
    remote.seed_bookmark("b1", "p1", "f1");
    selector.load_profiles(vec![Profile::new("p1")], None);
    store.sync_with_profile().await;
    (remote, selector, store)
}

#[tokio::test]
async fn test_initial_state_is_empty() {
    let (_remote, _selector, store) = setup();
    assert!(store.bookmarks().is_empty());
    assert!(store.bookmarked_file_ids().is_empty());
    assert!(!store.is_loading());
    assert_eq!(store.error(), None);
}

#[tokio::test]
async fn test_refresh_loads_newest_first() {
    let (_remote, _selector, store) = scenario_a().await;

    assert_eq!(store.bookmarked_file_ids(), ids(&["f1", "f2"]));
    let records = store.bookmarks();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].resource_id, "f1");
    assert_eq!(records[1].resource_id, "f2");
    assert_eq!(records[0].file_name.as_deref(), Some("Hypertension Protocol.pdf"));
    assert!(!store.is_loading());
    assert_eq!(store.error(), None);
    assert_coherent(&store);
}

#[tokio::test]
async fn test_toggle_adds_with_remote_id() {
    let (remote, _selector, store) = scenario_a().await;
    assert!(!store.is_bookmarked("f3"));

    remote.set_next_id("b9");
    let outcome = store.toggle_bookmark("f3").await.unwrap();

    assert!(outcome.is_bookmarked());
    let records = store.bookmarks();
    assert_eq!(records[0].id, "b9");
    assert_eq!(records[0].resource_id, "f3");
    assert_eq!(store.bookmarked_file_ids(), ids(&["f1", "f2", "f3"]));
    assert_coherent(&store);
}

#[tokio::test]
async fn test_toggle_removes_existing() {
    let (remote, _selector, store) = scenario_a().await;
    remote.set_next_id("b9");
    store.toggle_bookmark("f3").await.unwrap();

    let outcome = store.toggle_bookmark("f1").await.unwrap();

    assert_eq!(outcome, ToggleOutcome::Removed("f1".to_string()));
    assert_eq!(store.bookmarked_file_ids(), ids(&["f2", "f3"]));
    assert!(store.bookmarks().iter().all(|r| r.resource_id != "f1"));
    assert_eq!(remote.stored_resources("p1"), vec!["f2".to_string(), "f3".to_string()]);
    assert_coherent(&store);
}

#[tokio::test]
async fn test_blank_id_without_profile() {
    let (remote, _selector, store) = setup();

    let err = store.toggle_bookmark("").await.unwrap_err();

    assert!(matches!(err, BookmarkError::InvalidArgument(_)));
    assert_eq!(store.error().as_deref(), Some(INVALID_RESOURCE_ID_MESSAGE));
    assert!(store.bookmarks().is_empty());
    assert!(store.bookmarked_file_ids().is_empty());
    assert_eq!(remote.remote_calls(), 0);
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("\t\n")]
#[tokio::test]
async fn test_blank_ids_never_reach_remote(#[case] resource_id: &str) {
    let (remote, _selector, store) = scenario_a().await;
    let before = store.bookmarks();
    let calls = remote.remote_calls();

    let err = store.toggle_bookmark(resource_id).await.unwrap_err();

    assert!(matches!(err, BookmarkError::InvalidArgument(_)));
    assert_eq!(store.error().as_deref(), Some(INVALID_RESOURCE_ID_MESSAGE));
    assert_eq!(remote.remote_calls(), calls);
    assert_eq!(store.bookmarks(), before);
}

#[tokio::test]
async fn test_toggle_without_profile_fails() {
    let (remote, _selector, store) = setup();

    let err = store.toggle_bookmark("f1").await.unwrap_err();

    assert_eq!(err, BookmarkError::NoActiveProfile);
    assert_eq!(store.error().as_deref(), Some(NO_ACTIVE_PROFILE_MESSAGE));
    assert_eq!(remote.remote_calls(), 0);
}

#[tokio::test]
async fn test_profile_cleared_resets_state() {
    let (remote, selector, store) = scenario_a().await;
    remote.fail_insert.store(true, Ordering::SeqCst);
    let _ = store.toggle_bookmark("f9").await;
    assert!(store.error().is_some());

    selector.clear();
    store.sync_with_profile().await;

    assert!(store.bookmarks().is_empty());
    assert!(store.bookmarked_file_ids().is_empty());
    assert_eq!(store.error(), None);
}

#[tokio::test]
async fn test_refresh_without_profile_clears() {
    let (_remote, selector, store) = scenario_a().await;
    selector.clear();

    store.refresh().await;

    assert!(store.bookmarks().is_empty());
    assert!(store.bookmarked_file_ids().is_empty());
}

#[tokio::test]
async fn test_failed_delete_preserves_state() {
    let (remote, _selector, store) = scenario_a().await;
    let before = store.bookmarks();
    remote.fail_delete.store(true, Ordering::SeqCst);

    let err = store.toggle_bookmark("f1").await.unwrap_err();

    assert!(matches!(err, BookmarkError::RemoteFailure(_)));
    assert!(store.is_bookmarked("f1"));
    assert_eq!(store.bookmarks(), before);
    assert_eq!(store.error().as_deref(), Some("network timeout"));
    assert_coherent(&store);
}

#[tokio::test]
async fn test_failed_insert_preserves_state() {
    let (remote, _selector, store) = scenario_a().await;
    let before = store.bookmarks();
    remote.fail_insert.store(true, Ordering::SeqCst);

    let err = store.toggle_bookmark("f3").await.unwrap_err();

    assert!(matches!(err, BookmarkError::RemoteFailure(_)));
    assert!(!store.is_bookmarked("f3"));
    assert_eq!(store.bookmarks(), before);
    assert!(store.error().is_some());
}

#[tokio::test]
async fn test_failed_refresh_keeps_last_known_good() {
    let (remote, _selector, store) = scenario_a().await;
    let before = store.bookmarks();
    remote.fail_list.store(true, Ordering::SeqCst);

    store.refresh().await;

    assert_eq!(store.bookmarks(), before);
    assert_eq!(store.bookmarked_file_ids(), ids(&["f1", "f2"]));
    assert!(!store.is_loading());
    assert_eq!(store.error().as_deref(), Some("connection reset"));
}

#[tokio::test]
async fn test_blank_remote_message_uses_fallback() {
    let (remote, _selector, store) = scenario_a().await;
    remote.set_failure_message("  ");

    remote.fail_insert.store(true, Ordering::SeqCst);
    let err = store.toggle_bookmark("f3").await.unwrap_err();
    assert_eq!(err, BookmarkError::RemoteFailure("Failed to update bookmark".to_string()));
    assert_eq!(store.error().as_deref(), Some("Failed to update bookmark"));

    remote.fail_list.store(true, Ordering::SeqCst);
    store.refresh().await;
    assert_eq!(store.error().as_deref(), Some("Failed to fetch bookmarks"));
}

#[tokio::test]
async fn test_store_recovers_after_failure() {
    let (remote, _selector, store) = scenario_a().await;
    remote.fail_list.store(true, Ordering::SeqCst);
    store.refresh().await;
    assert!(store.error().is_some());

    remote.fail_list.store(false, Ordering::SeqCst);
    store.toggle_bookmark("f3").await.unwrap();

    assert_eq!(store.error(), None);
    assert!(store.is_bookmarked("f3"));
}

#[tokio::test]
async fn test_profile_switch_reloads() {
    let (remote, selector, store) = scenario_a().await;
    remote.seed_bookmark("b7", "p2", "f7");
    selector.load_profiles(vec![Profile::new("p1"), Profile::new("p2")], None);

    selector.select_profile("p2").unwrap();
    store.sync_with_profile().await;
    assert_eq!(store.bookmarked_file_ids(), ids(&["f7"]));

    selector.select_profile("p1").unwrap();
    store.sync_with_profile().await;
    assert_eq!(store.bookmarked_file_ids(), ids(&["f1", "f2"]));
}

#[tokio::test]
async fn test_sync_skips_unchanged_profile() {
    let (remote, _selector, store) = scenario_a().await;
    let calls = remote.list_calls.load(Ordering::SeqCst);

    store.sync_with_profile().await;

    assert_eq!(remote.list_calls.load(Ordering::SeqCst), calls);
}

#[tokio::test]
async fn test_refresh_for_inactive_profile_is_dropped() {
    let (remote, selector, store) = scenario_a().await;
    remote.hold_lists();

    let pending = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.refresh().await })
    };
    while remote.list_calls.load(Ordering::SeqCst) < 2 {
        tokio::task::yield_now().await;
    }
    assert!(store.is_loading());

    selector.clear();
    store.sync_with_profile().await;
    remote.release_lists();
    pending.await.unwrap();

    assert!(store.bookmarks().is_empty());
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_concurrent_toggles_match_remote() {
    let (remote, _selector, store) = scenario_a().await;

    let (a, b) = tokio::join!(store.toggle_bookmark("f5"), store.toggle_bookmark("f5"));
    assert!(a.is_ok() || b.is_ok());

    let remote_has = remote.stored_resources("p1").contains(&"f5".to_string());
    assert_eq!(store.is_bookmarked("f5"), remote_has);
    assert_coherent(&store);
}

#[tokio::test]
async fn test_listener_follows_selector() {
    let (remote, selector, store) = setup();
    remote.seed_bookmark("b1", "p1", "f1");
    let listener = store.spawn_profile_listener();

    selector.load_profiles(vec![Profile::new("p1")], None);
    let loaded = tokio::time::timeout(Duration::from_secs(5), async {
        while !store.is_bookmarked("f1") {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(loaded.is_ok(), "listener never loaded bookmarks");

    selector.clear();
    let cleared = tokio::time::timeout(Duration::from_secs(5), async {
        while !store.bookmarks().is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(cleared.is_ok(), "listener never cleared bookmarks");

    drop(selector);
    tokio::time::timeout(Duration::from_secs(5), listener)
        .await
        .expect("listener should stop when the selector is dropped")
        .unwrap();
}

#[tokio::test]
async fn test_filter_bookmarks_by_name() {
    let (_remote, _selector, store) = scenario_a().await;

    let hits = store.filter_bookmarks("inhaler");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].resource_id, "f2");
    assert_eq!(store.filter_bookmarks("").len(), 2);
}

#[tokio::test]
async fn test_snapshot_ids_are_sorted() {
    let (_remote, _selector, store) = scenario_a().await;

    let snapshot = store.snapshot();
    assert_eq!(snapshot.bookmarked_file_ids, vec!["f1".to_string(), "f2".to_string()]);
    assert_eq!(snapshot.bookmarks.len(), 2);
    assert!(!snapshot.is_loading);
}
