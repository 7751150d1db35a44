//! Active Profile Selector for rxportal.
//!
//! Holds the signed-in account's profiles and zero-or-one active profile.
//! The active profile is published on a `tokio::sync::watch` channel; the
//! bookmark store subscribes to it instead of polling.

use std::sync::{PoisonError, RwLock};

use tokio::sync::watch;
use tracing::info;

use crate::types::errors::ProfileError;
use crate::types::profile::Profile;

fn same_id(a: &Option<Profile>, b: &Option<Profile>) -> bool {
    a.as_ref().map(|p| &p.profile_id) == b.as_ref().map(|p| &p.profile_id)
}

pub struct ProfileSelector {
    profiles: RwLock<Vec<Profile>>,
    active: watch::Sender<Option<Profile>>,
}

impl Default for ProfileSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileSelector {
    pub fn new() -> Self {
        let (active, _) = watch::channel(None);
        Self {
            profiles: RwLock::new(Vec::new()),
            active,
        }
    }

    /// Receiver that observes every change of the active profile's identifier.
    pub fn subscribe(&self) -> watch::Receiver<Option<Profile>> {
        self.active.subscribe()
    }

    pub fn active_profile(&self) -> Option<Profile> {
        self.active.borrow().clone()
    }

    pub fn active_profile_id(&self) -> Option<String> {
        self.active.borrow().as_ref().map(|p| p.profile_id.clone())
    }

    pub fn profiles(&self) -> Vec<Profile> {
        self.profiles.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Stores `next` as the active profile. Subscribers are only woken when
    /// the identifier changes.
    fn publish(&self, next: Option<Profile>) {
        let changed = self.active.send_if_modified(|current| {
            let changed = !same_id(current, &next);
            *current = next;
            changed
        });
        if changed {
            info!(profile_id = ?self.active_profile_id(), "active profile changed");
        }
    }

    /// Replaces the profile list and resolves the active profile.
    ///
    /// A still-listed active profile stays active. Otherwise `stored_id` wins
    /// when it names a listed profile, then the first profile, then none.
    pub fn load_profiles(&self, profiles: Vec<Profile>, stored_id: Option<&str>) -> Option<Profile> {
        let current_id = self.active_profile_id();
        let resolved = current_id
            .as_deref()
            .and_then(|id| profiles.iter().find(|p| p.profile_id == id))
            .or_else(|| stored_id.and_then(|id| profiles.iter().find(|p| p.profile_id == id)))
            .or_else(|| profiles.first())
            .cloned();

        *self.profiles.write().unwrap_or_else(PoisonError::into_inner) = profiles;
        self.publish(resolved.clone());
        resolved
    }

    /// Activates a loaded profile.
    pub fn select_profile(&self, profile_id: &str) -> Result<Profile, ProfileError> {
        let selected = self
            .profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|p| p.profile_id == profile_id)
            .cloned()
            .ok_or_else(|| ProfileError::NotFound(profile_id.to_string()))?;
        self.publish(Some(selected.clone()));
        Ok(selected)
    }

    /// Drops a profile from the list. Removing the active profile activates
    /// the first remaining one, or none. Returns the active profile afterwards.
    pub fn remove_profile(&self, profile_id: &str) -> Option<Profile> {
        let first_remaining = {
            let mut profiles = self.profiles.write().unwrap_or_else(PoisonError::into_inner);
            profiles.retain(|p| p.profile_id != profile_id);
            profiles.first().cloned()
        };
        if self.active_profile_id().as_deref() == Some(profile_id) {
            self.publish(first_remaining);
        }
        self.active_profile()
    }

    /// Forgets every profile, e.g. on sign-out.
    pub fn clear(&self) {
        self.profiles.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.publish(None);
        info!("profiles cleared");
    }
}
