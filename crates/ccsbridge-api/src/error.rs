use thiserror::Error;

/// Top-level error type for the `ccsbridge-api` crate.
///
/// Covers every failure mode of the device's HTTP API: login, session
/// expiry, transport and payload decoding. `ccsbridge-core` treats all of
/// them as a reason to drop the session and retry on the next tick.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login was rejected or the response carried no session id.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The device answered 401 on an authenticated endpoint.
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, reset, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// Any non-success status other than 401.
    #[error("Unexpected HTTP {status} from device: {body}")]
    UnexpectedStatus { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates auth has expired
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::SessionExpired)
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::UnexpectedStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Map a `reqwest` failure, separating timeouts from other transport errors.
    pub(crate) fn from_send(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout { timeout_ms }
        } else {
            Self::Transport(err)
        }
    }
}
