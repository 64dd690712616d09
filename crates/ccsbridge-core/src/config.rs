// ── Runtime bridge configuration ──
//
// Describes *how* to reach the conference system controller and how
// often to poll it. Never touches disk: `ccsbridge-config` or the host
// builds a `BridgeConfig` and hands it in.

use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;
pub const MIN_POLL_INTERVAL_MS: u64 = 50;
pub const MAX_POLL_INTERVAL_MS: u64 = 10_000;

/// A configuration the bridge refuses to run with.
///
/// The `Display` text is what the host shows next to its bad-config status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Server IP is required")]
    MissingHost,

    #[error("Username is required")]
    MissingUsername,

    #[error("Server IP '{host}' is not a valid IPv4 address")]
    InvalidHost { host: String },

    #[error("Polling interval {interval_ms}ms is outside 50..=10000ms")]
    PollIntervalOutOfRange { interval_ms: u64 },
}

/// Connection settings for one controller.
///
/// Treated as an immutable snapshot: updates replace it wholesale.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Controller address, `a.b.c.d` or `a.b.c.d:port`.
    pub host: String,
    pub username: String,
    pub password: SecretString,
    pub poll_interval: Duration,
}

impl BridgeConfig {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: SecretString::from(password.into()),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    pub fn with_poll_interval_ms(mut self, interval_ms: u64) -> Self {
        self.poll_interval = Duration::from_millis(interval_ms);
        self
    }

    /// Check required fields first, then formats, in that order, so a
    /// blank form reports the first missing field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(ConfigError::MissingHost);
        }
        if self.username.trim().is_empty() {
            return Err(ConfigError::MissingUsername);
        }
        if !is_ipv4_host(host) {
            return Err(ConfigError::InvalidHost {
                host: host.to_owned(),
            });
        }

        let interval_ms = self.poll_interval_ms();
        if !(MIN_POLL_INTERVAL_MS..=MAX_POLL_INTERVAL_MS).contains(&interval_ms) {
            return Err(ConfigError::PollIntervalOutOfRange { interval_ms });
        }
        Ok(())
    }

    pub fn poll_interval_ms(&self) -> u64 {
        u64::try_from(self.poll_interval.as_millis()).unwrap_or(u64::MAX)
    }

    /// Whether `other` points at a different device or logs in as someone
    /// else. Such a change invalidates the current session.
    pub fn connection_changed(&self, other: &BridgeConfig) -> bool {
        self.host.trim() != other.host.trim()
            || self.username != other.username
            || self.password.expose_secret() != other.password.expose_secret()
    }
}

fn is_ipv4_host(host: &str) -> bool {
    host.parse::<Ipv4Addr>().is_ok() || host.parse::<SocketAddrV4>().is_ok()
}
