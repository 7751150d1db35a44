use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Substrings that mark a catalog file as a streamable video.
const VIDEO_MARKERS: [&str; 3] = [".mp4", ".webm", ".mov"];

/// One profile's saved reference to one catalog resource.
///
/// `file_name` and `file_url` are copied from the file catalog when the row is
/// read and are never written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkRecord {
    pub id: String,
    pub profile_id: String,
    pub resource_id: String,
    pub created_at: DateTime<Utc>,
    pub file_name: Option<String>,
    pub file_url: Option<String>,
}

impl BookmarkRecord {
    /// Name shown in the bookmarks panel.
    pub fn display_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or("Untitled Resource")
    }

    pub fn kind(&self) -> ResourceKind {
        ResourceKind::classify(self.file_name.as_deref())
    }
}

/// Display classification of a bookmarked file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Video,
    Document,
}

impl ResourceKind {
    /// Classifies a file by name. Anything that is not recognisably a video
    /// is a document.
    pub fn classify(file_name: Option<&str>) -> Self {
        match file_name {
            Some(name) => {
                let lower = name.to_lowercase();
                if VIDEO_MARKERS.iter().any(|m| lower.contains(m)) {
                    ResourceKind::Video
                } else {
                    ResourceKind::Document
                }
            }
            None => ResourceKind::Document,
        }
    }

    pub fn action_label(&self) -> &'static str {
        match self {
            ResourceKind::Video => "Play video",
            ResourceKind::Document => "Download file",
        }
    }
}

/// Returns true if `resource_id` can identify a catalog resource.
pub fn is_valid_resource_id(resource_id: &str) -> bool {
    !resource_id.trim().is_empty()
}

/// Result of a confirmed toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added(BookmarkRecord),
    Removed(String),
}

impl ToggleOutcome {
    /// Whether the resource is bookmarked after the toggle.
    pub fn is_bookmarked(&self) -> bool {
        matches!(self, ToggleOutcome::Added(_))
    }
}

/// Point-in-time copy of the bookmark store for presentation surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkSnapshot {
    pub bookmarks: Vec<BookmarkRecord>,
    /// Sorted for stable output.
    pub bookmarked_file_ids: Vec<String>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Case-insensitive file name filter used by the bookmarks panel search box.
///
/// An empty query keeps every record. Records without a file name never match
/// a non-empty query.
pub fn filter_by_file_name<'a>(records: &'a [BookmarkRecord], query: &str) -> Vec<&'a BookmarkRecord> {
    if query.is_empty() {
        return records.iter().collect();
    }
    let query = query.to_lowercase();
    records
        .iter()
        .filter(|r| {
            r.file_name
                .as_deref()
                .map(|name| name.to_lowercase().contains(&query))
                .unwrap_or(false)
        })
        .collect()
}
