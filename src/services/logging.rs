//! Log output for rxportal binaries.
//!
//! stdout carries JSON-RPC responses, so logs always go to stderr.

use tracing_subscriber::EnvFilter;

use crate::services::settings_engine::ENV_LOG;
use crate::types::settings::LoggingSettings;

/// Builds the filter: `RXPORTAL_LOG` first, then the configured directive,
/// then `info`.
pub fn build_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_env(ENV_LOG)
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global `fmt` subscriber. Returns false if one was already set.
pub fn init(settings: &LoggingSettings) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(settings))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}
