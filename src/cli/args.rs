use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::conversation::QuickAction;

#[derive(Parser, Debug)]
#[command(name = "carecompanion")]
#[command(version = "0.1.0")]
#[command(about = "A caring chat companion for older adults", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Companion service base URL (overrides configuration)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Keep the session in memory only; nothing is written to disk
    #[arg(long)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize configuration
    Init,
    /// Sign in and remember the session
    Login {
        #[arg(short, long)]
        email: String,
        /// Read from CARECOMPANION_PASSWORD when omitted
        #[arg(short, long, env = "CARECOMPANION_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the session and service status
    Status,
    /// Send one message and print the reply
    Say {
        /// Message text
        #[arg(conflicts_with_all = ["voice", "action"])]
        message: Vec<String>,

        /// Record a voice message for this many seconds
        #[arg(long, value_name = "SECONDS", conflicts_with = "action")]
        voice: Option<u64>,

        /// Run a quick action (medications, appointments, emergency, mood)
        #[arg(long, value_parser = parse_quick_action)]
        action: Option<QuickAction>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        output_format: OutputFormat,
    },
    /// Show previous conversations
    History {
        /// Number of entries to fetch
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Save a note to the conversation history
    Note {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Start a chat session (default)
    Chat,
    /// Show version information
    Version,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Text,
    /// JSON structured output
    Json,
    /// Markdown formatted output
    Markdown,
}

fn parse_quick_action(value: &str) -> Result<QuickAction, String> {
    QuickAction::from_str(value).ok_or_else(|| {
        format!(
            "unknown action '{}' (expected medications, appointments, emergency or mood)",
            value
        )
    })
}
