//! CLI configuration -- thin wrapper around `ccsbridge_config`.
//!
//! Adds the resolution step that layers `GlobalOpts` flag overrides
//! (--host, --username, --password, ...) on top of the active profile.

use secrecy::SecretString;

use ccsbridge_core::{BridgeConfig, TransportConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use ccsbridge_config::{Config, Profile, config_path, load_config, save_config};

/// Everything a device-facing command needs.
#[derive(Debug)]
pub struct Resolved {
    pub profile_name: String,
    pub bridge: BridgeConfig,
    pub transport: TransportConfig,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Load the config file and merge it with command-line overrides.
///
/// The result is not validated; `BridgeConfig::validate` decides whether
/// the device settings are usable.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let cfg = load_config()?;
    let (profile_name, profile) = effective_profile(global, &cfg)?;

    let password = match &global.password {
        Some(pw) => Some(SecretString::from(pw.clone())),
        None => ccsbridge_config::resolve_password(&profile, &profile_name),
    };

    Ok(Resolved {
        bridge: ccsbridge_config::profile_to_bridge_config(&profile, password),
        transport: transport_for(&profile, &cfg),
        profile_name,
    })
}

fn transport_for(profile: &Profile, cfg: &Config) -> TransportConfig {
    ccsbridge_config::profile_transport(Some(profile), &cfg.defaults)
}

/// The active profile with flag overrides applied.
///
/// A missing default profile is not an error: flags alone may be enough.
fn effective_profile(global: &GlobalOpts, cfg: &Config) -> Result<(String, Profile), CliError> {
    let (name, mut profile) = match cfg.active_profile(global.profile.as_deref())? {
        Some((name, profile)) => (name, profile.clone()),
        None => (active_profile_name(global, cfg), Profile::default()),
    };

    if let Some(host) = &global.host {
        profile.host = Some(host.clone());
    }
    if let Some(username) = &global.username {
        profile.username = Some(username.clone());
    }
    if let Some(ms) = global.poll_interval {
        profile.poll_interval_ms = ms;
    }
    if let Some(secs) = global.timeout {
        profile.timeout = Some(secs);
    }

    Ok((name, profile))
}
