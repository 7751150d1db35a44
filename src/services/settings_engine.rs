// rxportal Settings Engine
// Manages portal settings: loading, saving, updating individual values, and resetting to defaults.
// Settings are stored as a JSON file at the platform-specific config path.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::{PortalSettings, RemoteBackend};

pub const ENV_SUPABASE_URL: &str = "RXPORTAL_SUPABASE_URL";
pub const ENV_SUPABASE_ANON_KEY: &str = "RXPORTAL_SUPABASE_ANON_KEY";
pub const ENV_DATA_DIR: &str = "RXPORTAL_DATA_DIR";
pub const ENV_LOG: &str = "RXPORTAL_LOG";

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<PortalSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &PortalSettings;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// Settings engine implementation that persists settings as JSON on disk.
pub struct SettingsEngine {
    config_path: String,
    settings: PortalSettings,
}

impl SettingsEngine {
    /// Creates a new SettingsEngine.
    ///
    /// If `path_override` is `Some`, uses that path for the config file.
    /// Otherwise, uses the platform-specific config directory with `settings.json`.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = match path_override {
            Some(p) => p,
            None => platform::get_config_dir()
                .join("settings.json")
                .to_string_lossy()
                .to_string(),
        };

        Self {
            config_path,
            settings: PortalSettings::default(),
        }
    }

    /// Creates an engine that holds `settings` in memory and saves to `config_path`.
    pub fn with_settings(config_path: String, settings: PortalSettings) -> Self {
        Self {
            config_path,
            settings,
        }
    }

    /// Overlays `RXPORTAL_*` environment variables on the loaded settings.
    /// Overrides are not written back to disk unless something else saves.
    pub fn apply_env_overrides(&mut self) {
        apply_overrides(&mut self.settings, |name| std::env::var(name).ok());
    }

    /// Remembers (or forgets) the last selected profile and saves.
    pub fn set_last_active_profile(&mut self, profile_id: Option<&str>) -> Result<(), SettingsError> {
        let new_value = profile_id.map(str::to_string);
        if self.settings.session.last_active_profile_id == new_value {
            return Ok(());
        }
        self.settings.session.last_active_profile_id = new_value;
        self.save()
    }

    /// Path of the local SQLite database, falling back to the platform data dir.
    pub fn database_path(&self) -> String {
        if self.settings.local.database_path.is_empty() {
            platform::get_data_dir()
                .join("rxportal.db")
                .to_string_lossy()
                .to_string()
        } else {
            self.settings.local.database_path.clone()
        }
    }
}

/// Applies environment overrides using `lookup` to read variables.
///
/// Setting the hosted URL switches the backend to REST.
pub fn apply_overrides<F>(settings: &mut PortalSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty(ENV_SUPABASE_URL) {
        settings.remote.base_url = url;
        settings.remote.backend = RemoteBackend::Rest;
    }
    if let Some(key) = non_empty(ENV_SUPABASE_ANON_KEY) {
        settings.remote.anon_key = key;
    }
    if let Some(dir) = non_empty(ENV_DATA_DIR) {
        settings.local.database_path = Path::new(&dir).join("rxportal.db").to_string_lossy().to_string();
    }
    if let Some(filter) = non_empty(ENV_LOG) {
        settings.logging.filter = filter;
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from the JSON config file.
    ///
    /// If the file does not exist, returns default settings.
    /// If the file exists but is malformed, returns a serialization error.
    fn load(&mut self) -> Result<PortalSettings, SettingsError> {
        let path = Path::new(&self.config_path);

        if !path.exists() {
            debug!(path = %self.config_path, "no settings file, using defaults");
            self.settings = PortalSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;

        let settings: PortalSettings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;

        self.settings = settings;
        Ok(self.settings.clone())
    }

    /// Saves the current settings to the JSON config file, creating parent directories.
    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn get_settings(&self) -> &PortalSettings {
        &self.settings
    }

    /// Updates an individual setting by dot-notation key path and saves.
    ///
    /// # Examples
    /// - `"remote.base_url"` → updates `settings.remote.base_url`
    /// - `"logging.filter"` → updates `settings.logging.filter`
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }

        let parts: Vec<&str> = key.split('.').collect();

        let mut json_value = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        {
            let (last, path) = match parts.split_last() {
                Some(split) => split,
                None => return Err(SettingsError::InvalidKey("Key cannot be empty".to_string())),
            };

            let mut current = &mut json_value;
            for part in path {
                current = current.get_mut(*part).ok_or_else(|| {
                    SettingsError::InvalidKey(format!("Key '{}' not found in settings", key))
                })?;
            }

            match current {
                serde_json::Value::Object(map) if map.contains_key(*last) => {
                    map.insert(last.to_string(), value);
                }
                serde_json::Value::Object(_) => {
                    return Err(SettingsError::InvalidKey(format!(
                        "Key '{}' not found in settings",
                        key
                    )));
                }
                _ => {
                    return Err(SettingsError::InvalidKey(format!(
                        "Cannot navigate to key '{}': intermediate value is not an object",
                        key
                    )));
                }
            }
        }

        // Round-trip through the typed struct to validate the new value
        let new_settings: PortalSettings = serde_json::from_value(json_value).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;

        self.settings = new_settings;
        self.save()?;

        Ok(())
    }

    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = PortalSettings::default();
        self.save()?;
        Ok(())
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
