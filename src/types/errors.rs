use std::fmt;

/// Message stored when a toggle is attempted with a blank resource id.
pub const INVALID_RESOURCE_ID_MESSAGE: &str = "Invalid file ID - cannot bookmark this resource";

/// Message stored when a toggle is attempted without an active profile.
pub const NO_ACTIVE_PROFILE_MESSAGE: &str = "No active profile selected";

// === BookmarkError ===

/// Errors surfaced by the bookmark synchronization store.
///
/// Every variant is also recorded as the store's `error` message; the store
/// stays usable after any of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarkError {
    /// The resource identifier was empty or whitespace-only.
    InvalidArgument(String),
    /// The operation needs an active profile and none is selected.
    NoActiveProfile,
    /// The remote store rejected or failed the request.
    RemoteFailure(String),
}

impl BookmarkError {
    /// Human-readable message shown to the member.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkError::InvalidArgument(_) => write!(f, "{}", INVALID_RESOURCE_ID_MESSAGE),
            BookmarkError::NoActiveProfile => write!(f, "{}", NO_ACTIVE_PROFILE_MESSAGE),
            BookmarkError::RemoteFailure(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for BookmarkError {}

// === RemoteError ===

/// Errors returned by a `RemoteStore` adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The request never produced a response (connect, timeout, TLS).
    Network(String),
    /// The service answered with a non-success status.
    Api { status: u16, message: String },
    /// The response body did not have the expected shape.
    Decode(String),
    /// The local SQLite store failed.
    Database(String),
    /// The requested row does not exist.
    NotFound(String),
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Network(msg) => write!(f, "Network error: {}", msg),
            RemoteError::Api { status, message } => {
                write!(f, "Remote store error ({}): {}", status, message)
            }
            RemoteError::Decode(msg) => write!(f, "Unexpected response: {}", msg),
            RemoteError::Database(msg) => write!(f, "Database error: {}", msg),
            RemoteError::NotFound(what) => write!(f, "Not found: {}", what),
        }
    }
}

impl std::error::Error for RemoteError {}

// === ProfileError ===

/// Errors related to active profile selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// No loaded profile has the given ID.
    NotFound(String),
    /// Loading the account's profiles failed.
    LoadFailed(String),
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileError::NotFound(id) => write!(f, "Profile not found: {}", id),
            ProfileError::LoadFailed(msg) => write!(f, "Failed to load profiles: {}", msg),
        }
    }
}

impl std::error::Error for ProfileError {}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}
