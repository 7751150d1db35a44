//! Bookmark Synchronization Store for rxportal.
//!
//! Keeps the active profile's bookmark records, and the set of bookmarked
//! resource ids derived from them, in step with the remote bookmark table.
//!
//! Every mutation is confirmed remotely before it is applied locally. Failures
//! never escape as panics or poisoned state: they are recorded in `error` and
//! the store keeps serving reads and accepting new operations.
//!
//! Refreshes and toggles are not sequenced against each other. If both are in
//! flight, whichever completes last decides the final snapshot. The one
//! ordering the store does enforce is per profile: results fetched or
//! confirmed for a profile that is no longer active are dropped.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::{watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::services::remote_store::RemoteStore;
use crate::types::bookmark::{
    filter_by_file_name, is_valid_resource_id, BookmarkRecord, BookmarkSnapshot, ToggleOutcome,
};
use crate::types::errors::{BookmarkError, RemoteError};
use crate::types::profile::Profile;

const FETCH_FAILED: &str = "Failed to fetch bookmarks";
const UPDATE_FAILED: &str = "Failed to update bookmark";

/// Records plus the id set derived from them. The two are only ever changed
/// together, through the methods below.
#[derive(Debug, Default)]
struct BookmarkState {
    records: Vec<BookmarkRecord>,
    bookmarked: HashSet<String>,
    pending_refreshes: usize,
    error: Option<String>,
}

impl BookmarkState {
    fn replace(&mut self, records: Vec<BookmarkRecord>) {
        self.bookmarked = records.iter().map(|r| r.resource_id.clone()).collect();
        self.records = records;
    }

    /// Prepends a confirmed record. A record already held for the same
    /// resource is replaced rather than duplicated.
    fn prepend(&mut self, record: BookmarkRecord) {
        self.records.retain(|r| r.resource_id != record.resource_id);
        self.bookmarked.insert(record.resource_id.clone());
        self.records.insert(0, record);
    }

    fn remove(&mut self, resource_id: &str) {
        self.records.retain(|r| r.resource_id != resource_id);
        self.bookmarked.remove(resource_id);
    }

    /// Back to the initial state. Outstanding refreshes are still counted.
    fn clear(&mut self) {
        self.records.clear();
        self.bookmarked.clear();
        self.error = None;
    }
}

/// Maps a remote failure to the message shown to the member: the remote's own
/// message, or `fallback` when that is blank.
fn describe(err: &RemoteError, fallback: &str) -> String {
    let message = match err {
        RemoteError::Api { message, .. } => message,
        RemoteError::Network(message)
        | RemoteError::Decode(message)
        | RemoteError::Database(message)
        | RemoteError::NotFound(message) => message,
    };
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message.clone()
    }
}

/// Client-side view of one profile's bookmarks.
pub struct BookmarkStore {
    remote: Arc<dyn RemoteStore>,
    profile: watch::Receiver<Option<Profile>>,
    state: RwLock<BookmarkState>,
    /// Last profile id acted on. Held for the whole of a sync, so a caller
    /// waits for a sync already running for the same profile.
    observed_profile: AsyncMutex<Option<String>>,
}

impl BookmarkStore {
    /// Creates an empty store that scopes every operation to the profile
    /// currently published on `profile`.
    pub fn new(remote: Arc<dyn RemoteStore>, profile: watch::Receiver<Option<Profile>>) -> Self {
        Self {
            remote,
            profile,
            state: RwLock::new(BookmarkState::default()),
            observed_profile: AsyncMutex::new(None),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, BookmarkState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BookmarkState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_profile_id(&self) -> Option<String> {
        self.profile.borrow().as_ref().map(|p| p.profile_id.clone())
    }

    fn is_active(&self, profile_id: &str) -> bool {
        self.current_profile_id().as_deref() == Some(profile_id)
    }

    /// Records `err` as the store's error and hands it back.
    fn fail(&self, err: BookmarkError) -> BookmarkError {
        self.write().error = Some(err.message());
        err
    }

    // ─── Profile tracking ───

    /// Reacts to the active profile as it is now: a new non-null profile is
    /// fetched, a null profile clears everything, an unchanged one is left alone.
    ///
    /// Syncs run one at a time. Returning means the store reflects the profile
    /// that was active when this call got its turn, whoever did the fetch.
    pub async fn sync_with_profile(&self) {
        let mut observed = self.observed_profile.lock().await;
        let current = self.current_profile_id();
        if *observed == current {
            return;
        }
        *observed = current.clone();

        match current {
            Some(profile_id) => {
                info!(%profile_id, "profile changed, reloading bookmarks");
                self.refresh().await;
            }
            None => {
                info!("no active profile, clearing bookmarks");
                self.write().clear();
            }
        }
    }

    /// Runs [`sync_with_profile`](Self::sync_with_profile) once now and again
    /// after every change published by the profile selector. The task ends when
    /// the selector is dropped.
    pub fn spawn_profile_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let store = Arc::clone(self);
        let mut changes = self.profile.clone();
        tokio::spawn(async move {
            store.sync_with_profile().await;
            while changes.changed().await.is_ok() {
                store.sync_with_profile().await;
            }
            debug!("profile channel closed, bookmark listener stopped");
        })
    }

    // ─── Operations ───

    /// Reloads the active profile's bookmarks, newest first.
    ///
    /// Without an active profile the store is cleared instead. On failure the
    /// previous records are kept and `error` is set.
    pub async fn refresh(&self) {
        let Some(profile_id) = self.current_profile_id() else {
            self.write().clear();
            return;
        };

        {
            let mut state = self.write();
            state.pending_refreshes += 1;
            state.error = None;
        }

        let result = self.remote.list_bookmarks(&profile_id).await;

        let mut state = self.write();
        state.pending_refreshes = state.pending_refreshes.saturating_sub(1);

        if !self.is_active(&profile_id) {
            debug!(%profile_id, "dropping bookmarks fetched for an inactive profile");
            return;
        }

        match result {
            Ok(records) => {
                debug!(%profile_id, count = records.len(), "bookmarks loaded");
                state.replace(records);
                state.error = None;
            }
            Err(e) => {
                warn!(%profile_id, error = %e, "failed to fetch bookmarks");
                state.error = Some(describe(&e, FETCH_FAILED));
            }
        }
    }

    /// Adds the bookmark if absent, removes it if present.
    ///
    /// The remote write happens first; local state only changes once it is
    /// confirmed. Any failure leaves records and ids exactly as they were and
    /// is recorded in `error` as well as returned.
    pub async fn toggle_bookmark(&self, resource_id: &str) -> Result<ToggleOutcome, BookmarkError> {
        if !is_valid_resource_id(resource_id) {
            warn!(resource_id, "rejected blank resource id");
            return Err(self.fail(BookmarkError::InvalidArgument(resource_id.to_string())));
        }
        let Some(profile_id) = self.current_profile_id() else {
            return Err(self.fail(BookmarkError::NoActiveProfile));
        };

        let currently_bookmarked = {
            let mut state = self.write();
            state.error = None;
            state.bookmarked.contains(resource_id)
        };

        if currently_bookmarked {
            match self.remote.delete_bookmark(&profile_id, resource_id).await {
                Ok(()) => {
                    if self.is_active(&profile_id) {
                        self.write().remove(resource_id);
                    }
                    debug!(%profile_id, resource_id, "bookmark removed");
                    Ok(ToggleOutcome::Removed(resource_id.to_string()))
                }
                Err(e) => {
                    warn!(%profile_id, resource_id, error = %e, "failed to remove bookmark");
                    Err(self.fail(BookmarkError::RemoteFailure(describe(&e, UPDATE_FAILED))))
                }
            }
        } else {
            match self.remote.insert_bookmark(&profile_id, resource_id).await {
                Ok(record) => {
                    if self.is_active(&profile_id) {
                        self.write().prepend(record.clone());
                    }
                    debug!(%profile_id, resource_id, id = %record.id, "bookmark added");
                    Ok(ToggleOutcome::Added(record))
                }
                Err(e) => {
                    warn!(%profile_id, resource_id, error = %e, "failed to add bookmark");
                    Err(self.fail(BookmarkError::RemoteFailure(describe(&e, UPDATE_FAILED))))
                }
            }
        }
    }

    // ─── Projections ───

    pub fn is_bookmarked(&self, resource_id: &str) -> bool {
        self.read().bookmarked.contains(resource_id)
    }

    /// Records, newest first.
    pub fn bookmarks(&self) -> Vec<BookmarkRecord> {
        self.read().records.clone()
    }

    pub fn bookmarked_file_ids(&self) -> HashSet<String> {
        self.read().bookmarked.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.read().pending_refreshes > 0
    }

    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    /// Records whose file name contains `query`, ignoring case.
    pub fn filter_bookmarks(&self, query: &str) -> Vec<BookmarkRecord> {
        let state = self.read();
        filter_by_file_name(&state.records, query).into_iter().cloned().collect()
    }

    /// Consistent copy of everything presentation surfaces render.
    pub fn snapshot(&self) -> BookmarkSnapshot {
        let state = self.read();
        let mut ids: Vec<String> = state.bookmarked.iter().cloned().collect();
        ids.sort();
        BookmarkSnapshot {
            bookmarks: state.records.clone(),
            bookmarked_file_ids: ids,
            is_loading: state.pending_refreshes > 0,
            error: state.error.clone(),
        }
    }
}
