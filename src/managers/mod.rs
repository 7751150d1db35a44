// rxportal state managers
// Managers own client-side state: the active profile, the bookmark snapshot and the panel flag.

pub mod bookmark_store;
pub mod bookmarks_panel;
pub mod profile_selector;
