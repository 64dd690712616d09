//! CLI error types with miette diagnostics.
//!
//! Maps library errors into user-facing errors with actionable help text
//! and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use ccsbridge_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────

    #[error("Invalid configuration: {reason}")]
    #[diagnostic(
        code(ccsbridge::bad_config),
        help(
            "Pass --host and --username, or create a profile with: ccsbridge config init"
        )
    )]
    InvalidConfig { reason: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(ccsbridge::profile_not_found),
        help("List profiles with: ccsbridge config show")
    )]
    ProfileNotFound { name: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ccsbridge::validation))]
    Validation { field: String, reason: String },

    #[error("Could not load configuration: {message}")]
    #[diagnostic(code(ccsbridge::config))]
    Config { message: String },

    // ── Device ───────────────────────────────────────────────────────

    #[error("Login rejected by the device: {message}")]
    #[diagnostic(
        code(ccsbridge::auth_failed),
        help("Check the username and password for this profile.")
    )]
    AuthFailed { message: String },

    #[error("Could not reach the device")]
    #[diagnostic(
        code(ccsbridge::connection_failed),
        help("Check that the device is powered and reachable on the configured address.")
    )]
    ConnectionFailed {
        #[source]
        source: ccsbridge_api::Error,
    },

    #[error("Request timed out after {timeout_ms}ms")]
    #[diagnostic(
        code(ccsbridge::timeout),
        help("Increase the timeout with --timeout or check the network path to the device.")
    )]
    Timeout { timeout_ms: u64 },

    #[error("Device error: {message}")]
    #[diagnostic(code(ccsbridge::device))]
    Device { message: String },

    #[error(transparent)]
    #[diagnostic(code(ccsbridge::bridge))]
    Bridge(CoreError),

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render JSON: {0}")]
    #[diagnostic(code(ccsbridge::json))]
    Json(#[from] serde_json::Error),

    #[error("Could not render YAML: {0}")]
    #[diagnostic(code(ccsbridge::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidConfig { .. } | Self::ProfileNotFound { .. } | Self::Validation { .. } => {
                exit_code::USAGE
            }
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Library error mapping ────────────────────────────────────────────

impl From<ccsbridge_api::Error> for CliError {
    fn from(err: ccsbridge_api::Error) -> Self {
        use ccsbridge_api::Error as ApiError;

        match err {
            ApiError::Authentication { message } => Self::AuthFailed { message },
            ApiError::SessionExpired => Self::AuthFailed {
                message: "session expired".into(),
            },
            ApiError::Timeout { timeout_ms } => Self::Timeout { timeout_ms },
            err @ ApiError::Transport(_) => Self::ConnectionFailed { source: err },
            ApiError::InvalidUrl(e) => Self::Validation {
                field: "host".into(),
                reason: e.to_string(),
            },
            other => Self::Device {
                message: other.to_string(),
            },
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Config(e) => Self::InvalidConfig {
                reason: e.to_string(),
            },
            CoreError::Api(e) => e.into(),
            other => Self::Bridge(other),
        }
    }
}

impl From<ccsbridge_core::ConfigError> for CliError {
    fn from(err: ccsbridge_core::ConfigError) -> Self {
        Self::InvalidConfig {
            reason: err.to_string(),
        }
    }
}

impl From<ccsbridge_config::ConfigError> for CliError {
    fn from(err: ccsbridge_config::ConfigError) -> Self {
        use ccsbridge_config::ConfigError;

        match err {
            ConfigError::UnknownProfile { profile } => Self::ProfileNotFound { name: profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_exit_with_usage() {
        let err = CliError::from(ccsbridge_core::ConfigError::MissingHost);
        assert_eq!(err.exit_code(), exit_code::USAGE);
        assert_eq!(err.to_string(), "Invalid configuration: Server IP is required");
    }

    #[test]
    fn rejected_login_exits_with_auth() {
        let err = CliError::from(ccsbridge_api::Error::Authentication {
            message: "HTTP 403".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn core_wraps_api_errors() {
        let err = CliError::from(CoreError::Api(ccsbridge_api::Error::Timeout { timeout_ms: 500 }));
        assert!(matches!(err, CliError::Timeout { timeout_ms: 500 }));
        assert_eq!(err.exit_code(), exit_code::TIMEOUT);
    }

    #[test]
    fn unknown_profile_maps_to_not_found() {
        let err = CliError::from(ccsbridge_config::ConfigError::UnknownProfile {
            profile: "hall".into(),
        });
        assert!(matches!(err, CliError::ProfileNotFound { ref name } if name == "hall"));
    }
}
