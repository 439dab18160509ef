use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    api::{CareApi, HttpCareApi},
    app::{get_data_dir, load_config, load_config_file, Config},
    cli::{handle_command, require_session, Cli, Commands, OutputFormat},
    session::{FileStore, MemoryStore, SessionManager, SessionStore},
    tui::{run_ui, App},
};

use super::non_interactive::{NonInteractiveRunner, SayInput};

/// Main runtime orchestrator
pub struct Orchestrator {
    cli: Cli,
    config: Config,
    sessions: SessionManager,
}

impl Orchestrator {
    /// Create a new orchestrator from CLI args
    pub fn new(cli: Cli) -> Result<Self> {
        // Load configuration
        let mut config = if let Some(config_path) = &cli.config {
            load_config_file(config_path)?
        } else {
            match load_config() {
                Ok(cfg) => cfg,
                Err(e) => {
                    eprintln!("⚠️  Failed to load config: {}. Using defaults.", e);
                    Config::default()
                }
            }
        };

        if let Some(api_url) = &cli.api_url {
            config.api.base_url = api_url.clone();
        }

        let api: Arc<dyn CareApi> = Arc::new(HttpCareApi::new(&config.api)?);
        let store = Self::session_store(&cli, &config)?;
        let sessions = SessionManager::new(api, store);

        Ok(Self {
            cli,
            config,
            sessions,
        })
    }

    /// Where the token and profile slots live
    fn session_store(cli: &Cli, config: &Config) -> Result<Arc<dyn SessionStore>> {
        if cli.ephemeral {
            info!("Ephemeral session: nothing is written to disk");
            return Ok(Arc::new(MemoryStore::new()));
        }

        let dir = match &config.session.storage_dir {
            Some(dir) => dir.clone(),
            None => get_data_dir()?.join("session"),
        };
        Ok(Arc::new(FileStore::new(dir)))
    }

    /// Run the orchestrator
    pub async fn run(mut self) -> Result<()> {
        self.restore().await;

        // Handle subcommands
        if let Some(command) = &self.cli.command {
            if handle_command(command, &mut self.sessions, &self.config).await? {
                return Ok(()); // Command handled, exit
            }

            if let Commands::Say {
                message,
                voice,
                action,
                output_format,
            } = command
            {
                let input = match (voice, action) {
                    (Some(seconds), _) => SayInput::Voice(*seconds),
                    (None, Some(action)) => SayInput::QuickAction(*action),
                    (None, None) => SayInput::Text(message.join(" ")),
                };
                return self.run_say(input, *output_format).await;
            }
            // Continue to chat for Commands::Chat
        }

        let app = App::new(self.sessions, self.config.ui.clone());
        run_ui(app).await
    }

    /// Bring back the stored session, verifying it first when configured to
    async fn restore(&mut self) {
        if self.sessions.restore_session().is_none() {
            return;
        }

        if self.config.session.verify_on_restore && !self.sessions.verify_session().await {
            warn!("Stored session was rejected by the service");
        }
    }

    /// One exchange without the terminal UI
    async fn run_say(&self, input: SayInput, format: OutputFormat) -> Result<()> {
        let session = require_session(&self.sessions)?.clone();
        let mut runner = NonInteractiveRunner::new(session, self.sessions.api());

        let result = runner.execute(input).await?;
        println!("{}", runner.format_result(&result, format));

        Ok(())
    }
}
