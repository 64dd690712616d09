//! Clap derive structures for the `ccsbridge` CLI.
//!
//! Defines the command tree, global flags, and shared types. Kept free of
//! crate-internal imports so `build.rs` can include it for man pages.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ccsbridge -- active microphone bridge for Bosch CCS 1000 D
#[derive(Debug, Parser)]
#[command(
    name = "ccsbridge",
    version,
    about = "Publish the active conference microphone to a control surface",
    long_about = "Logs into a Bosch CCS 1000 D discussion system, polls the list of\n\
        microphones that have the floor, and publishes the main speaker as\n\
        the `active_mic` variable together with actions and feedbacks.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Device profile to use
    #[arg(long, short = 'p', env = "CCSBRIDGE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Device IPv4 address, optionally with :port (overrides profile)
    #[arg(long, short = 'H', env = "CCSBRIDGE_HOST", global = true)]
    pub host: Option<String>,

    /// Device login name (overrides profile)
    #[arg(long, short = 'u', env = "CCSBRIDGE_USERNAME", global = true)]
    pub username: Option<String>,

    /// Device password (prefer the env var or the keyring)
    #[arg(
        long,
        env = "CCSBRIDGE_PASSWORD",
        global = true,
        hide_env_values = true
    )]
    pub password: Option<String>,

    /// Poll interval in milliseconds (50-10000)
    #[arg(long, env = "CCSBRIDGE_POLL_INTERVAL", global = true)]
    pub poll_interval: Option<u64>,

    /// Request timeout in seconds
    #[arg(long, env = "CCSBRIDGE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CCSBRIDGE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the bridge until Ctrl-C, printing variable and status updates
    #[command(alias = "w")]
    Watch,

    /// Log in once and list the microphones that have the floor
    #[command(alias = "ls")]
    Speakers,

    /// Show the variables, actions, feedbacks and config fields exported to the host
    Describe,

    /// Manage configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display the configuration file (passwords redacted)
    Show,

    /// Create a profile with guided setup
    Init,

    /// Store a profile's password in the system keyring
    SetPassword {
        /// Profile name (defaults to the active profile)
        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
