//! Property-based tests for bookmark toggling.
//!
//! Arbitrary sequences of toggles, refreshes and injected remote failures
//! must keep the id set and the record list describing the same bookmarks,
//! and both must match what the remote holds after every confirmed step.

#[path = "../common/mod.rs"]
mod common;

use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::ScriptedRemote;
use proptest::prelude::*;
use rxportal::managers::bookmark_store::BookmarkStore;
use rxportal::managers::profile_selector::ProfileSelector;
use rxportal::services::remote_store::RemoteStore;
use rxportal::types::profile::Profile;

#[derive(Debug, Clone)]
enum Op {
    Toggle(usize),
    Refresh,
    FailNext,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (0usize..5).prop_map(Op::Toggle),
        1 => Just(Op::Refresh),
        1 => Just(Op::FailNext),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build runtime")
}

fn setup() -> (Arc<ScriptedRemote>, ProfileSelector, BookmarkStore) {
    let remote = ScriptedRemote::new();
    let selector = ProfileSelector::new();
    selector.load_profiles(vec![Profile::new("p1")], None);
    let dyn_remote: Arc<dyn RemoteStore> = remote.clone();
    let store = BookmarkStore::new(dyn_remote, selector.subscribe());
    (remote, selector, store)
}

fn set_fail_all(remote: &ScriptedRemote, fail: bool) {
    remote.fail_list.store(fail, Ordering::SeqCst);
    remote.fail_insert.store(fail, Ordering::SeqCst);
    remote.fail_delete.store(fail, Ordering::SeqCst);
}

// **Set/list coherence**
//
// *For any* sequence of operations, the bookmarked id set SHALL equal the
// resource ids of the held records, with no resource held twice, and SHALL
// match the remote rows for the active profile.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn toggles_keep_set_and_list_coherent(ops in proptest::collection::vec(arb_op(), 1..30)) {
        let rt = runtime();
        let (remote, _selector, store) = setup();

        rt.block_on(async {
            store.sync_with_profile().await;
            let mut fail_next = false;

            for op in &ops {
                set_fail_all(&remote, fail_next);
                match op {
                    Op::Toggle(n) => {
                        let resource = format!("f{}", n);
                        let before = store.is_bookmarked(&resource);
                        let result = store.toggle_bookmark(&resource).await;
                        if fail_next {
                            prop_assert!(result.is_err());
                            prop_assert_eq!(store.is_bookmarked(&resource), before);
                            prop_assert!(store.error().is_some());
                        } else {
                            prop_assert!(result.is_ok());
                            prop_assert_eq!(store.is_bookmarked(&resource), !before);
                        }
                    }
                    Op::Refresh => store.refresh().await,
                    Op::FailNext => {}
                }
                fail_next = matches!(op, Op::FailNext);

                let records = store.bookmarks();
                let from_records: HashSet<String> =
                    records.iter().map(|r| r.resource_id.clone()).collect();
                prop_assert_eq!(from_records.len(), records.len());
                prop_assert_eq!(&store.bookmarked_file_ids(), &from_records);

                let remote_ids: HashSet<String> =
                    remote.stored_resources("p1").into_iter().collect();
                prop_assert_eq!(&from_records, &remote_ids);
                prop_assert!(!store.is_loading());
            }
            Ok(())
        })?;
    }

    // **Double toggle is identity**
    //
    // *For any* resource and starting state, two successful toggles SHALL
    // leave membership where it started.
    #[test]
    fn double_toggle_restores_membership(
        start in proptest::collection::hash_set(0usize..5, 0..5),
        target in 0usize..5,
    ) {
        let rt = runtime();
        let (remote, _selector, store) = setup();
        for n in &start {
            remote.seed_bookmark(&format!("b{}", n), "p1", &format!("f{}", n));
        }

        rt.block_on(async {
            store.sync_with_profile().await;
            let resource = format!("f{}", target);
            let before = store.bookmarked_file_ids();

            let first = store.toggle_bookmark(&resource).await;
            let second = store.toggle_bookmark(&resource).await;
            prop_assert!(first.is_ok() && second.is_ok());
            prop_assert_eq!(store.bookmarked_file_ids(), before);
            prop_assert_eq!(remote.stored_resources("p1").len(), start.len());
            Ok(())
        })?;
    }
}
