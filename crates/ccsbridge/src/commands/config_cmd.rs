//! Config subcommand handlers.

use dialoguer::{Input, Select};

use ccsbridge_core::BridgeConfig;
use ccsbridge_core::config::DEFAULT_POLL_INTERVAL_MS;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Hide plaintext passwords before printing.
fn redact(mut cfg: Config) -> Config {
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(REDACTED.into());
        }
    }
    cfg
}

fn summary(cfg: &Config) -> String {
    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    let default = cfg.default_profile.as_deref().unwrap_or("default");

    let mut lines = vec![format!("default profile: {default}")];
    for name in names {
        let p = &cfg.profiles[name];
        lines.push(format!(
            "[{name}] host={} username={} poll_interval_ms={}",
            p.host.as_deref().unwrap_or("-"),
            p.username.as_deref().unwrap_or("-"),
            p.poll_interval_ms,
        ));
    }
    lines.join("\n")
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = redact(config::load_config()?);
            let out = output::render_single(global.output, &cfg, summary, |c| {
                let mut names: Vec<_> = c.profiles.keys().cloned().collect();
                names.sort();
                names.join("\n")
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Init => init(global),

        ConfigCommand::SetPassword { name } => {
            let cfg = config::load_config()?;
            let name = name.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            let password = rpassword::prompt_password(format!("Password for profile '{name}': "))
                .map_err(prompt_err)?;
            ccsbridge_config::store_password(&name, &password)?;
            eprintln!("✓ Password for '{name}' stored in system keyring");
            Ok(())
        }
    }
}

/// Interactive wizard: write (or replace) one profile and make it the default.
fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("ccsbridge configuration wizard");
    eprintln!("  Config path: {}\n", config_path.display());

    let mut cfg = config::load_config()?;

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default(config::active_profile_name(global, &cfg))
        .interact_text()
        .map_err(prompt_err)?;

    let host: String = Input::new()
        .with_prompt("Device IP address")
        .interact_text()
        .map_err(prompt_err)?;

    let username: String = Input::new()
        .with_prompt("Username")
        .interact_text()
        .map_err(prompt_err)?;

    let poll_interval_ms: u64 = Input::new()
        .with_prompt("Polling interval (ms)")
        .default(DEFAULT_POLL_INTERVAL_MS)
        .interact_text()
        .map_err(prompt_err)?;

    // Catch typos before anything is written.
    BridgeConfig::new(host.clone(), username.clone(), String::new())
        .with_poll_interval_ms(poll_interval_ms)
        .validate()?;

    let password = rpassword::prompt_password("Password: ").map_err(prompt_err)?;

    let store_choices = &[
        "Store password in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let store_selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let password_field = if store_selection == 0 {
        ccsbridge_config::store_password(&profile_name, &password)?;
        eprintln!("  ✓ Password stored in system keyring");
        None
    } else {
        Some(password)
    };

    cfg.profiles.insert(
        profile_name.clone(),
        Profile {
            host: Some(host),
            username: Some(username),
            password: password_field,
            password_env: None,
            poll_interval_ms,
            timeout: None,
        },
    );
    cfg.default_profile = Some(profile_name.clone());
    config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: ccsbridge speakers");
    Ok(())
}
