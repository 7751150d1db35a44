//! SQLite-backed `RemoteStore` for offline development and tests.
//!
//! Mirrors the hosted tables closely enough that the bookmark core cannot tell
//! the difference: the same (profile, resource) uniqueness, the same catalog
//! join, the same newest-first ordering.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use crate::database::connection::Database;
use crate::services::remote_store::RemoteStore;
use crate::types::bookmark::BookmarkRecord;
use crate::types::errors::RemoteError;
use crate::types::profile::Profile;

const BOOKMARK_COLUMNS: &str = "b.id, b.profile_id, b.resource_id, b.created_at, c.file_name, c.file_url";

/// Bookmark store backed by a local SQLite database.
pub struct LocalRemoteStore {
    db: Mutex<Database>,
}

impl LocalRemoteStore {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RemoteError> {
        let db = Database::open(path).map_err(|e| RemoteError::Database(e.to_string()))?;
        Ok(Self::new(db))
    }

    pub fn open_in_memory() -> Result<Self, RemoteError> {
        let db = Database::open_in_memory().map_err(|e| RemoteError::Database(e.to_string()))?;
        Ok(Self::new(db))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Database>, RemoteError> {
        self.db.lock().map_err(|e| RemoteError::Database(e.to_string()))
    }

    /// Timestamps are stored with fixed precision so text order is time order.
    fn now_text() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn parse_time(text: &str) -> Result<DateTime<Utc>, RemoteError> {
        DateTime::parse_from_rfc3339(text)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| RemoteError::Decode(format!("bad timestamp '{}': {}", text, e)))
    }

    /// Inserts or replaces a profile row.
    pub fn add_profile(&self, profile: &Profile) -> Result<(), RemoteError> {
        let created_at = profile
            .created_at
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Micros, true))
            .unwrap_or_else(Self::now_text);
        self.lock()?
            .connection()
            .execute(
                "INSERT OR REPLACE INTO member_profiles (profile_id, account_id, first_name, last_name, profile_role, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    profile.profile_id,
                    profile.account_id,
                    profile.first_name,
                    profile.last_name,
                    profile.profile_role,
                    created_at
                ],
            )
            .map_err(|e| RemoteError::Database(e.to_string()))?;
        Ok(())
    }

    /// Inserts or replaces a file catalog entry.
    pub fn add_catalog_file(&self, file_id: &str, file_name: &str, file_url: &str) -> Result<(), RemoteError> {
        self.lock()?
            .connection()
            .execute(
                "INSERT OR REPLACE INTO storage_files_catalog (file_id, file_name, file_url) VALUES (?1, ?2, ?3)",
                params![file_id, file_name, file_url],
            )
            .map_err(|e| RemoteError::Database(e.to_string()))?;
        Ok(())
    }

    fn row_to_parts(row: &rusqlite::Row) -> rusqlite::Result<(String, String, String, String, Option<String>, Option<String>)> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?))
    }

    fn parts_to_record(
        parts: (String, String, String, String, Option<String>, Option<String>),
    ) -> Result<BookmarkRecord, RemoteError> {
        let (id, profile_id, resource_id, created_at, file_name, file_url) = parts;
        Ok(BookmarkRecord {
            id,
            profile_id,
            resource_id,
            created_at: Self::parse_time(&created_at)?,
            file_name: file_name.filter(|s| !s.is_empty()),
            file_url: file_url.filter(|s| !s.is_empty()),
        })
    }

    fn fetch_one(db: &Database, id: &str) -> Result<BookmarkRecord, RemoteError> {
        let sql = format!(
            "SELECT {} FROM bookmarks b LEFT JOIN storage_files_catalog c ON c.file_id = b.resource_id WHERE b.id = ?1",
            BOOKMARK_COLUMNS
        );
        let parts = db
            .connection()
            .query_row(&sql, params![id], Self::row_to_parts)
            .optional()
            .map_err(|e| RemoteError::Database(e.to_string()))?
            .ok_or_else(|| RemoteError::NotFound(format!("bookmark {}", id)))?;
        Self::parts_to_record(parts)
    }
}

#[async_trait]
impl RemoteStore for LocalRemoteStore {
    async fn list_bookmarks(&self, profile_id: &str) -> Result<Vec<BookmarkRecord>, RemoteError> {
        let db = self.lock()?;
        let sql = format!(
            "SELECT {} FROM bookmarks b LEFT JOIN storage_files_catalog c ON c.file_id = b.resource_id \
             WHERE b.profile_id = ?1 ORDER BY b.created_at DESC, b.rowid DESC",
            BOOKMARK_COLUMNS
        );
        let mut stmt = db
            .connection()
            .prepare(&sql)
            .map_err(|e| RemoteError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![profile_id], Self::row_to_parts)
            .map_err(|e| RemoteError::Database(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            let parts = row.map_err(|e| RemoteError::Database(e.to_string()))?;
            results.push(Self::parts_to_record(parts)?);
        }
        debug!(profile_id, count = results.len(), "listed local bookmarks");
        Ok(results)
    }

    async fn insert_bookmark(&self, profile_id: &str, resource_id: &str) -> Result<BookmarkRecord, RemoteError> {
        let db = self.lock()?;
        let id = Uuid::new_v4().to_string();
        db.connection()
            .execute(
                "INSERT INTO bookmarks (id, profile_id, resource_id, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![id, profile_id, resource_id, Self::now_text()],
            )
            .map_err(|e| RemoteError::Database(e.to_string()))?;
        Self::fetch_one(&db, &id)
    }

    /// Deleting a pair that does not exist succeeds, as it does remotely.
    async fn delete_bookmark(&self, profile_id: &str, resource_id: &str) -> Result<(), RemoteError> {
        let affected = self
            .lock()?
            .connection()
            .execute(
                "DELETE FROM bookmarks WHERE profile_id = ?1 AND resource_id = ?2",
                params![profile_id, resource_id],
            )
            .map_err(|e| RemoteError::Database(e.to_string()))?;
        debug!(profile_id, resource_id, affected, "deleted local bookmark");
        Ok(())
    }

    async fn list_profiles(&self, account_id: &str) -> Result<Vec<Profile>, RemoteError> {
        let db = self.lock()?;
        let mut stmt = db
            .connection()
            .prepare(
                "SELECT profile_id, account_id, first_name, last_name, profile_role, created_at \
                 FROM member_profiles WHERE account_id = ?1 ORDER BY created_at ASC, rowid ASC",
            )
            .map_err(|e| RemoteError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![account_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                ))
            })
            .map_err(|e| RemoteError::Database(e.to_string()))?;

        let mut profiles = Vec::new();
        for row in rows {
            let (profile_id, account_id, first_name, last_name, profile_role, created_at) =
                row.map_err(|e| RemoteError::Database(e.to_string()))?;
            let created_at = match created_at {
                Some(text) => Some(Self::parse_time(&text)?),
                None => None,
            };
            profiles.push(Profile {
                profile_id,
                account_id,
                first_name,
                last_name,
                profile_role,
                created_at,
            });
        }
        Ok(profiles)
    }
}
