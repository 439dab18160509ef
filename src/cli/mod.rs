/// CLI argument parsing and command handling - Gateway
mod args;
mod commands;

pub use args::{Cli, Commands, OutputFormat};
pub use commands::{
    format_history_entry, handle_command, probe_service, require_session, show_version,
};
