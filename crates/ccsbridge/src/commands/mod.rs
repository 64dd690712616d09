//! Subcommand handlers, one module per top-level command.

pub mod config_cmd;
pub mod describe;
pub mod speakers;
pub mod watch;
