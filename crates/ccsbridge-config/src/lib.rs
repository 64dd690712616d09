//! Shared configuration for ccsbridge.
//!
//! TOML device profiles, password resolution (env + keyring + plaintext),
//! and translation to `ccsbridge_core::BridgeConfig`. The binary layers
//! its command-line overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ccsbridge_core::config::DEFAULT_POLL_INTERVAL_MS;
use ccsbridge_core::{BridgeConfig, TransportConfig};

const KEYRING_SERVICE: &str = "ccsbridge";

/// Environment variable consulted first for the device password.
pub const PASSWORD_ENV: &str = "CCSBRIDGE_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named device profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    5
}

/// A named device profile.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Profile {
    /// Device IPv4 address, optionally with `:port`.
    pub host: Option<String>,

    pub username: Option<String>,

    /// Plaintext password; prefer the keyring or an env var.
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Override the default request timeout (seconds).
    pub timeout: Option<u64>,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            host: None,
            username: None,
            password: None,
            password_env: None,
            poll_interval_ms: default_poll_interval_ms(),
            timeout: None,
        }
    }
}

impl Config {
    /// Pick the profile named explicitly, else the default profile.
    ///
    /// An explicit name that does not exist is an error; a missing default
    /// profile yields `None` so callers can fall back to flags alone.
    pub fn active_profile(
        &self,
        requested: Option<&str>,
    ) -> Result<Option<(String, &Profile)>, ConfigError> {
        if let Some(name) = requested {
            return self
                .profiles
                .get(name)
                .map(|p| Some((name.to_owned(), p)))
                .ok_or_else(|| ConfigError::UnknownProfile {
                    profile: name.to_owned(),
                });
        }

        let name = self.default_profile.as_deref().unwrap_or("default");
        Ok(self.profiles.get(name).map(|p| (name.to_owned(), p)))
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "ccsbridge", "ccsbridge").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("ccsbridge");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path`, layered over defaults and under
/// `CCSBRIDGE_`-prefixed environment variables (`__` separates nesting,
/// e.g. `CCSBRIDGE_DEFAULTS__TIMEOUT`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CCSBRIDGE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is unreadable.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the device password: profile's `password_env`, then
/// `CCSBRIDGE_PASSWORD`, then the system keyring, then plaintext.
///
/// Returns `None` when nothing is configured; the device may accept an
/// empty password.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    // 1. Env vars
    let env_names = profile.password_env.iter().map(String::as_str).chain([PASSWORD_ENV]);
    for env_name in env_names {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name)) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    profile
        .password
        .as_ref()
        .map(|pw| SecretString::from(pw.clone()))
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name))?;
    entry.set_password(password)?;
    Ok(())
}

fn keyring_user(profile_name: &str) -> String {
    format!("{profile_name}/password")
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `BridgeConfig` from a profile, with an already-resolved password.
///
/// Missing fields are passed through empty: `BridgeConfig::validate` is
/// what turns them into a bad-config status.
pub fn profile_to_bridge_config(profile: &Profile, password: Option<SecretString>) -> BridgeConfig {
    let mut config = BridgeConfig::new(
        profile.host.clone().unwrap_or_default(),
        profile.username.clone().unwrap_or_default(),
        String::new(),
    )
    .with_poll_interval_ms(profile.poll_interval_ms);
    if let Some(password) = password {
        config.password = password;
    }
    config
}

/// Transport settings for a profile, falling back to global defaults.
pub fn profile_transport(profile: Option<&Profile>, defaults: &Defaults) -> TransportConfig {
    let secs = profile
        .and_then(|p| p.timeout)
        .unwrap_or(defaults.timeout);
    TransportConfig::default().with_timeout(Duration::from_secs(secs))
}
