//! The hosted data service as seen by the bookmark core.
//!
//! `RemoteStore` is the only seam between the synchronization store and the
//! outside world. Adapters translate their own failures into [`RemoteError`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::bookmark::BookmarkRecord;
use crate::types::errors::RemoteError;
use crate::types::profile::Profile;

/// Columns requested for every bookmark read, including the catalog join.
pub const BOOKMARK_SELECT: &str =
    "id,profile_id,resource_id,created_at,storage_files_catalog!resource_id(file_name,file_url)";

/// Per-profile bookmark table plus the file catalog it joins against.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// All bookmarks of `profile_id`, newest `created_at` first.
    async fn list_bookmarks(&self, profile_id: &str) -> Result<Vec<BookmarkRecord>, RemoteError>;

    /// Inserts the (profile, resource) pair and returns the stored row with
    /// its catalog fields.
    async fn insert_bookmark(&self, profile_id: &str, resource_id: &str) -> Result<BookmarkRecord, RemoteError>;

    async fn delete_bookmark(&self, profile_id: &str, resource_id: &str) -> Result<(), RemoteError>;

    /// Profiles of an account, oldest first.
    async fn list_profiles(&self, account_id: &str) -> Result<Vec<Profile>, RemoteError>;
}

/// Catalog columns nested under a bookmark row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogJoin {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
}

/// A bookmark row exactly as the data service returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkRow {
    pub id: String,
    pub profile_id: String,
    pub resource_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub storage_files_catalog: Option<CatalogJoin>,
}

impl BookmarkRow {
    /// Flattens the join. Missing or empty catalog values become `None`.
    pub fn into_record(self) -> BookmarkRecord {
        let join = self.storage_files_catalog.unwrap_or_default();
        BookmarkRecord {
            id: self.id,
            profile_id: self.profile_id,
            resource_id: self.resource_id,
            created_at: self.created_at,
            file_name: join.file_name.filter(|s| !s.is_empty()),
            file_url: join.file_url.filter(|s| !s.is_empty()),
        }
    }
}
