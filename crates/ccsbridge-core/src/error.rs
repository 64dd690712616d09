// ── Core error types ──
//
// Errors returned by `Bridge` lifecycle calls. Poll-time device failures
// never surface here: the poll loop absorbs them and retries.

use thiserror::Error;

use crate::config::ConfigError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The configuration was rejected; the host shows it as bad config.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A device client could not be created for the configured host.
    #[error("Cannot create device client: {0}")]
    Api(#[from] ccsbridge_api::Error),

    /// The bridge is not polling (never initialised or last config was bad).
    #[error("Bridge is not running")]
    NotRunning,

    /// The bridge was destroyed and cannot be reused.
    #[error("Bridge has been stopped")]
    Stopped,
}

impl CoreError {
    /// Returns `true` if the host should show a bad-config status for this error.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Api(_))
    }
}
