//! Bookmarks panel visibility for rxportal.
//!
//! One shared open/closed flag that any surface (dashboard, program page,
//! resource library, floating button) may flip. Last writer wins.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use tracing::debug;

#[derive(Debug, Default)]
pub struct BookmarksPanel {
    open: AtomicBool,
}

impl BookmarksPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub fn open(&self) {
        self.open.store(true, Ordering::SeqCst);
        debug!("bookmarks panel opened");
    }

    /// Closes the panel. Callers reset transient panel state (the search
    /// term) alongside this.
    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
        debug!("bookmarks panel closed");
    }

    /// Flips the flag and returns the new value.
    pub fn toggle(&self) -> bool {
        !self.open.fetch_xor(true, Ordering::SeqCst)
    }
}

/// Search box text of the bookmarks panel.
#[derive(Debug, Default)]
pub struct PanelSearch {
    term: RwLock<String>,
}

impl PanelSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term(&self) -> String {
        self.term.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set_term(&self, term: &str) {
        *self.term.write().unwrap_or_else(PoisonError::into_inner) = term.to_string();
    }

    pub fn reset(&self) {
        self.term.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
