// rxportal platform paths
// Resolves where settings and the local database live on each OS.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "rxportal";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirKind {
    Config,
    Data,
}

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

#[cfg(target_os = "linux")]
fn base_dir(kind: DirKind) -> PathBuf {
    let (xdg, fallback): (&str, &[&str]) = match kind {
        DirKind::Config => ("XDG_CONFIG_HOME", &[".config"]),
        DirKind::Data => ("XDG_DATA_HOME", &[".local", "share"]),
    };
    match env::var(xdg) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => fallback.iter().fold(home_dir(), |p, seg| p.join(seg)),
    }
}

#[cfg(target_os = "macos")]
fn base_dir(_kind: DirKind) -> PathBuf {
    home_dir().join("Library").join("Application Support")
}

#[cfg(target_os = "windows")]
fn base_dir(kind: DirKind) -> PathBuf {
    let var = match kind {
        DirKind::Config => "APPDATA",
        DirKind::Data => "LOCALAPPDATA",
    };
    env::var(var).map(PathBuf::from).unwrap_or_else(|_| home_dir())
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn base_dir(kind: DirKind) -> PathBuf {
    match kind {
        DirKind::Config => home_dir().join(".config"),
        DirKind::Data => home_dir().join(".local").join("share"),
    }
}

/// Directory holding `settings.json`.
///
/// - **Linux**: `$XDG_CONFIG_HOME/rxportal` or `~/.config/rxportal`
/// - **macOS**: `~/Library/Application Support/rxportal`
/// - **Windows**: `%APPDATA%/rxportal`
pub fn get_config_dir() -> PathBuf {
    base_dir(DirKind::Config).join(APP_DIR)
}

/// Directory holding the local SQLite store.
///
/// - **Linux**: `$XDG_DATA_HOME/rxportal` or `~/.local/share/rxportal`
/// - **macOS**: `~/Library/Application Support/rxportal`
/// - **Windows**: `%LOCALAPPDATA%/rxportal`
pub fn get_data_dir() -> PathBuf {
    base_dir(DirKind::Data).join(APP_DIR)
}
