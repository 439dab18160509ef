use anyhow::Result;
use clap::Parser;

use carecompanion::{
    app::get_data_dir,
    cli::{Cli, Commands},
    runtime::Orchestrator,
    utils::init_logger,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // The terminal UI owns the screen, so its logs go to a file
    let interactive = matches!(cli.command, None | Some(Commands::Chat));
    let log_file = if interactive {
        get_data_dir().ok().map(|dir| dir.join("carecompanion.log"))
    } else {
        None
    };
    init_logger(cli.verbose, log_file.as_deref())?;

    // Create and run the orchestrator
    let orchestrator = Orchestrator::new(cli)?;
    orchestrator.run().await
}
