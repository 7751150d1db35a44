//! App Core for rxportal.
//!
//! Owns every manager and service for one portal session and wires them
//! together: the selector publishes the active profile, the bookmark store
//! follows it, and presentation surfaces reach both through this struct.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::managers::bookmark_store::BookmarkStore;
use crate::managers::bookmarks_panel::{BookmarksPanel, PanelSearch};
use crate::managers::profile_selector::ProfileSelector;
use crate::services::local_store::LocalRemoteStore;
use crate::services::remote_store::RemoteStore;
use crate::services::rest_client::RestRemoteStore;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::errors::ProfileError;
use crate::types::profile::Profile;
use crate::types::settings::RemoteBackend;

/// Central session struct holding all managers and services.
pub struct App {
    pub remote: Arc<dyn RemoteStore>,
    pub profiles: ProfileSelector,
    pub bookmarks: Arc<BookmarkStore>,
    pub panel: BookmarksPanel,
    pub panel_search: PanelSearch,
    settings_engine: Mutex<SettingsEngine>,
}

impl App {
    /// Wires a session around an already-built remote store.
    pub fn new(settings_engine: SettingsEngine, remote: Arc<dyn RemoteStore>) -> Self {
        let profiles = ProfileSelector::new();
        let bookmarks = Arc::new(BookmarkStore::new(Arc::clone(&remote), profiles.subscribe()));
        Self {
            remote,
            profiles,
            bookmarks,
            panel: BookmarksPanel::new(),
            panel_search: PanelSearch::new(),
            settings_engine: Mutex::new(settings_engine),
        }
    }

    /// Builds the remote adapter named by the loaded settings.
    pub fn from_settings(settings_engine: SettingsEngine) -> Result<Self, Box<dyn std::error::Error>> {
        let settings = settings_engine.get_settings().clone();
        let remote: Arc<dyn RemoteStore> = match settings.remote.backend {
            RemoteBackend::Rest => Arc::new(RestRemoteStore::new(&settings.remote)?),
            RemoteBackend::Local => {
                let path = settings_engine.database_path();
                if let Some(parent) = std::path::Path::new(&path).parent() {
                    std::fs::create_dir_all(parent)?;
                }
                Arc::new(LocalRemoteStore::open(&path)?)
            }
        };
        info!(backend = ?settings.remote.backend, "remote store ready");
        Ok(Self::new(settings_engine, remote))
    }

    pub fn settings(&self) -> MutexGuard<'_, SettingsEngine> {
        self.settings_engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remember_profile(&self, profile_id: Option<&str>) {
        if let Err(e) = self.settings().set_last_active_profile(profile_id) {
            warn!(error = %e, "could not persist last active profile");
        }
    }

    /// Keeps the bookmark store following profile changes made from anywhere.
    pub fn spawn_profile_listener(&self) -> JoinHandle<()> {
        self.bookmarks.spawn_profile_listener()
    }

    /// Loads the account's profiles, restores the last active one and
    /// loads its bookmarks.
    pub async fn sign_in(&self, account_id: &str) -> Result<Option<Profile>, ProfileError> {
        let profiles = self
            .remote
            .list_profiles(account_id)
            .await
            .map_err(|e| ProfileError::LoadFailed(e.to_string()))?;
        info!(account_id, count = profiles.len(), "signed in");

        let stored = self.settings().get_settings().session.last_active_profile_id.clone();
        let active = self.profiles.load_profiles(profiles, stored.as_deref());
        self.remember_profile(active.as_ref().map(|p| p.profile_id.as_str()));
        self.bookmarks.sync_with_profile().await;
        Ok(active)
    }

    /// Forgets profiles and bookmarks and closes the panel.
    pub async fn sign_out(&self) {
        self.profiles.clear();
        self.remember_profile(None);
        self.bookmarks.sync_with_profile().await;
        self.close_panel();
        info!("signed out");
    }

    pub async fn select_profile(&self, profile_id: &str) -> Result<Profile, ProfileError> {
        let profile = self.profiles.select_profile(profile_id)?;
        self.remember_profile(Some(&profile.profile_id));
        self.bookmarks.sync_with_profile().await;
        Ok(profile)
    }

    /// Closes the bookmarks panel and clears its search box.
    pub fn close_panel(&self) {
        self.panel.close();
        self.panel_search.reset();
    }
}
