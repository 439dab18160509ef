use anyhow::{bail, Result};
use colored::Colorize;
use std::time::Duration;

use crate::{
    api::{ConversationRecord, NewConversationRecord},
    app::{get_config_dir, init_config, Config},
    constants::{DEFAULT_HISTORY_LIMIT, STATUS_PROBE_TIMEOUT_MS},
    session::{has_valid_session, Session, SessionManager},
};

use super::Commands;

/// Handle CLI subcommands
///
/// Returns `false` when the command is not handled here and the caller
/// should continue (chat and say).
pub async fn handle_command(
    command: &Commands,
    sessions: &mut SessionManager,
    config: &Config,
) -> Result<bool> {
    match command {
        Commands::Init => {
            println!("Initializing CareCompanion configuration...");
            init_config()?;
            println!("Configuration initialized successfully!");
            Ok(true)
        }
        Commands::Login { email, password } => {
            let session = sessions.login(email, password).await?;
            println!("{} Signed in as {}", "✓".green(), session.display_name.bold());
            Ok(true)
        }
        Commands::Logout => {
            let was_signed_in = sessions.is_authenticated();
            sessions.logout()?;
            if was_signed_in {
                println!("Signed out. Take care!");
            } else {
                println!("No one was signed in.");
            }
            Ok(true)
        }
        Commands::Status => {
            show_status(sessions, config).await?;
            Ok(true)
        }
        Commands::History { limit } => {
            show_history(sessions, limit.unwrap_or(DEFAULT_HISTORY_LIMIT)).await?;
            Ok(true)
        }
        Commands::Note { text } => {
            save_note(sessions, &text.join(" ")).await?;
            Ok(true)
        }
        Commands::Version => {
            show_version();
            Ok(true)
        }
        Commands::Say { .. } | Commands::Chat => Ok(false),
    }
}

/// The current session, or an error telling the user how to get one
pub fn require_session(sessions: &SessionManager) -> Result<&Session> {
    match sessions.current() {
        Some(session) if has_valid_session(Some(session)) => Ok(session),
        _ => bail!("Not signed in. Run `carecompanion login --email <EMAIL>` first."),
    }
}

/// Show version information
pub fn show_version() {
    println!("CareCompanion v{}", env!("CARGO_PKG_VERSION"));
    println!("   A caring chat companion for older adults");
}

/// Show session, configuration and service status
async fn show_status(sessions: &SessionManager, config: &Config) -> Result<()> {
    println!("CareCompanion Status:");
    println!();

    match sessions.current() {
        Some(session) if has_valid_session(Some(session)) => println!(
            "  [OK] Session: signed in as {} ({})",
            session.display_name, session.profile.email
        ),
        _ => println!("  [WARNING] Session: not signed in"),
    }

    let endpoint = sessions.api().endpoint();
    if probe_service(&endpoint).await {
        println!("  [OK] Companion service: reachable at {}", endpoint);
    } else {
        println!(
            "  [ERROR] Companion service: not reachable at {} (replies will come from the offline helper)",
            endpoint
        );
    }

    match get_config_dir() {
        Ok(dir) if dir.join("config.toml").exists() => {
            println!("  [OK] Configuration: {}", dir.join("config.toml").display())
        }
        _ => println!("  [WARNING] Configuration: Not found (using defaults)"),
    }

    if config.session.verify_on_restore {
        println!("  Stored sessions are verified with the service on start");
    }

    println!();
    Ok(())
}

/// Any HTTP answer counts as reachable, whatever its status
pub async fn probe_service(base_url: &str) -> bool {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_millis(STATUS_PROBE_TIMEOUT_MS))
        .build()
    {
        Ok(client) => client,
        Err(_) => return false,
    };

    client.get(base_url).send().await.is_ok()
}

async fn show_history(sessions: &SessionManager, limit: usize) -> Result<()> {
    let session = require_session(sessions)?;
    let page = sessions
        .api()
        .conversations(session.user_id, &session.token, limit)
        .await?;

    if page.conversations.is_empty() {
        println!("No conversations yet.");
        return Ok(());
    }

    println!(
        "Showing {} of {} messages (newest first):",
        page.conversations.len(),
        page.total
    );
    println!();
    for record in &page.conversations {
        let line = format_history_entry(record);
        if record.contains_concern {
            println!("{}", line.yellow());
        } else {
            println!("{}", line);
        }
    }

    Ok(())
}

/// One history line: time, speaker, text and any mood or concern marker
pub fn format_history_entry(record: &ConversationRecord) -> String {
    let speaker = match record.message_type.as_str() {
        "user" => "You",
        "ai" => "Companion",
        other => other,
    };

    let mut line = format!("{}  [{}] {}", record.timestamp, speaker, record.message_text);
    if let Some(score) = record.mood_score {
        line.push_str(&format!("  (Mood: {}/10)", score));
    }
    if record.contains_concern {
        line.push_str("  (shared with caregiver)");
    }
    line
}

async fn save_note(sessions: &SessionManager, text: &str) -> Result<()> {
    let session = require_session(sessions)?;
    if text.trim().is_empty() {
        bail!("The note is empty");
    }

    sessions
        .api()
        .record_message(&NewConversationRecord::user_note(text), &session.token)
        .await?;
    println!("{} Note saved", "✓".green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockCareApi;
    use crate::session::MemoryStore;
    use std::sync::Arc;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record(message_type: &str, mood_score: Option<i64>, contains_concern: bool) -> ConversationRecord {
        ConversationRecord {
            id: 1,
            user_id: 1,
            message_text: "I feel a bit dizzy".to_string(),
            message_type: message_type.to_string(),
            timestamp: "2026-10-19T09:30:00".to_string(),
            mood_score,
            contains_concern,
        }
    }

    #[test]
    fn test_history_entry_format() {
        assert_eq!(
            format_history_entry(&record("user", None, false)),
            "2026-10-19T09:30:00  [You] I feel a bit dizzy"
        );
        assert_eq!(
            format_history_entry(&record("ai", Some(4), true)),
            "2026-10-19T09:30:00  [Companion] I feel a bit dizzy  (Mood: 4/10)  (shared with caregiver)"
        );
    }

    #[test]
    fn test_require_session_without_login() {
        let sessions = SessionManager::new(Arc::new(MockCareApi::new()), Arc::new(MemoryStore::new()));
        let err = require_session(&sessions).unwrap_err();
        assert!(err.to_string().contains("Not signed in"));
    }

    #[tokio::test]
    async fn test_history_requires_session() {
        // No expectations: any call to the service would panic
        let mut sessions =
            SessionManager::new(Arc::new(MockCareApi::new()), Arc::new(MemoryStore::new()));
        let config = Config::default();
        let result = handle_command(&Commands::History { limit: None }, &mut sessions, &config).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_chat_falls_through() {
        let mut sessions =
            SessionManager::new(Arc::new(MockCareApi::new()), Arc::new(MemoryStore::new()));
        let config = Config::default();
        assert!(!handle_command(&Commands::Chat, &mut sessions, &config).await.unwrap());
    }

    #[tokio::test]
    async fn test_probe_service() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert!(probe_service(&server.uri()).await);
        assert!(!probe_service("http://127.0.0.1:1").await);
    }
}
