use serde::{Deserialize, Serialize};

/// Top-level portal settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct PortalSettings {
    pub remote: RemoteSettings,
    pub local: LocalSettings,
    pub logging: LoggingSettings,
    pub session: SessionSettings,
}

/// Which `RemoteStore` adapter the app talks to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RemoteBackend {
    /// Hosted PostgREST endpoint.
    Rest,
    /// SQLite file on this machine.
    Local,
}

/// Connection settings for the hosted database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteSettings {
    pub backend: RemoteBackend,
    pub base_url: String,
    pub anon_key: String,
    /// Signed-in user's JWT. Falls back to the anon key when absent.
    pub access_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            backend: RemoteBackend::Local,
            base_url: String::new(),
            anon_key: String::new(),
            access_token: None,
            timeout_secs: 30,
        }
    }
}

/// Settings for the local SQLite store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LocalSettings {
    /// Empty means `<data dir>/rxportal.db`.
    pub database_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "rxportal=info".to_string(),
        }
    }
}

/// Values remembered between runs of the portal session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SessionSettings {
    pub last_active_profile_id: Option<String>,
}
