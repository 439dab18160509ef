use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::{
    api::CareApi,
    cli::OutputFormat,
    conversation::{ConversationController, QuickAction, ReplySource},
    session::Session,
};

/// Extra wait after a recording so the last whole second is delivered
const RECORDING_GRACE_MS: u64 = 200;

/// What a single non-interactive exchange sends
#[derive(Debug, Clone, PartialEq)]
pub enum SayInput {
    Text(String),
    QuickAction(QuickAction),
    /// Record for this many seconds, then send the voice message
    Voice(u64),
}

/// Result of a non-interactive run
#[derive(Debug, Serialize, Deserialize)]
pub struct NonInteractiveResult {
    /// The message that was sent on the user's behalf
    pub prompt: String,
    /// The companion's reply
    pub reply: String,
    /// "remote" or "fallback"
    pub source: String,
    pub is_voice_origin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flagged_concern: Option<bool>,
    /// Execution time in milliseconds
    pub duration_ms: u128,
}

/// Non-interactive runner for a single exchange
pub struct NonInteractiveRunner {
    controller: ConversationController,
}

impl NonInteractiveRunner {
    /// Create a runner on top of an authenticated session
    pub fn new(session: Session, api: Arc<dyn CareApi>) -> Self {
        Self {
            controller: ConversationController::new(session, api),
        }
    }

    /// Send one message through the conversation pipeline and collect the reply
    pub async fn execute(&mut self, input: SayInput) -> Result<NonInteractiveResult> {
        let start_time = std::time::Instant::now();

        let source = match input {
            SayInput::Text(text) => self.controller.send_user_message(&text, false).await,
            SayInput::QuickAction(action) => self.controller.run_quick_action(action).await,
            SayInput::Voice(seconds) => {
                self.controller.start_recording();
                tokio::time::sleep(
                    Duration::from_secs(seconds) + Duration::from_millis(RECORDING_GRACE_MS),
                )
                .await;
                match self.controller.stop_recording() {
                    Some(outbound) => {
                        let outcome = outbound.dispatch().await;
                        Some(self.controller.complete_send(outcome))
                    }
                    None => None,
                }
            }
        };

        let source = source.ok_or_else(|| anyhow!("Nothing to send: the message is empty"))?;
        let duration_ms = start_time.elapsed().as_millis();

        let messages = self.controller.messages();
        let (prompt, reply) = match messages {
            [.., prompt, reply] => (prompt, reply),
            _ => return Err(anyhow!("Conversation is missing the exchange")),
        };

        Ok(NonInteractiveResult {
            prompt: prompt.text.clone(),
            reply: reply.text.clone(),
            source: match source {
                ReplySource::Remote => "remote".to_string(),
                ReplySource::Fallback => "fallback".to_string(),
            },
            is_voice_origin: prompt.is_voice_origin,
            mood_score: reply.mood_score,
            flagged_concern: reply.flagged_concern,
            duration_ms,
        })
    }

    /// Format the result according to the output format
    pub fn format_result(&self, result: &NonInteractiveResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(result).unwrap_or_else(|e| {
                format!("{{\"error\": \"Failed to serialize result: {}\"}}", e)
            }),
            OutputFormat::Text => {
                let mut output = String::new();
                output.push_str(&result.reply);

                let mut notes = Vec::new();
                if let Some(score) = result.mood_score {
                    notes.push(format!("Mood: {}/10", score));
                }
                if result.flagged_concern == Some(true) {
                    notes.push("Shared with your caregiver".to_string());
                }
                if result.source == "fallback" {
                    notes.push("answered offline".to_string());
                }
                if !notes.is_empty() {
                    output.push_str(&format!("\n\n({})", notes.join(", ")));
                }

                output
            }
            OutputFormat::Markdown => {
                let mut output = String::new();

                output.push_str("## You\n\n");
                if result.is_voice_origin {
                    output.push_str("🎤 ");
                }
                output.push_str(&result.prompt);
                output.push_str("\n\n## Companion\n\n");
                output.push_str(&result.reply);
                output.push_str("\n\n");

                output.push_str("---\n");
                let mood = result
                    .mood_score
                    .map(|score| format!("{}/10", score))
                    .unwrap_or_else(|| "n/a".to_string());
                output.push_str(&format!(
                    "*Source: {} | Mood: {} | Duration: {}ms*\n",
                    result.source, mood, result.duration_ms
                ));

                output
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ChatReply, MockCareApi, UserProfile};
    use crate::conversation::fallback_reply;
    use crate::utils::CompanionError;
    use pretty_assertions::assert_eq;

    fn session() -> Session {
        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "id": 1,
            "email": "mary@example.com",
            "full_name": "Mary Johnson"
        }))
        .unwrap();
        Session::new("jwt-abc", profile)
    }

    fn runner(api: MockCareApi) -> NonInteractiveRunner {
        NonInteractiveRunner::new(session(), Arc::new(api))
    }

    #[tokio::test]
    async fn test_remote_exchange() {
        let mut api = MockCareApi::new();
        api.expect_chat().times(1).returning(|_, _| {
            Ok(ChatReply {
                response: "That sounds lovely.".to_string(),
                mood_score: Some(8),
                contains_concern: Some(false),
                intent: None,
                conversation_id: Some(12),
            })
        });

        let mut runner = runner(api);
        let result = runner
            .execute(SayInput::Text("I went for a walk".to_string()))
            .await
            .unwrap();

        assert_eq!(result.prompt, "I went for a walk");
        assert_eq!(result.reply, "That sounds lovely.");
        assert_eq!(result.source, "remote");
        assert_eq!(result.mood_score, Some(8));
        assert!(!result.is_voice_origin);
    }

    #[tokio::test]
    async fn test_quick_action_falls_back_offline() {
        let mut api = MockCareApi::new();
        api.expect_chat()
            .withf(|message, _| message == "Show me my medications")
            .times(1)
            .returning(|_, _| Err(CompanionError::NetworkError("connection refused".into())));

        let mut runner = runner(api);
        let result = runner
            .execute(SayInput::QuickAction(QuickAction::Medications))
            .await
            .unwrap();

        assert_eq!(result.source, "fallback");
        assert_eq!(result.reply, fallback_reply("Show me my medications"));
        assert_eq!(result.mood_score, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_voice_exchange() {
        let mut api = MockCareApi::new();
        api.expect_chat()
            .withf(|message, _| message == "Voice message recorded (3s)")
            .times(1)
            .returning(|_, _| Err(CompanionError::NetworkError("offline".into())));

        let mut runner = runner(api);
        let result = runner.execute(SayInput::Voice(3)).await.unwrap();

        assert_eq!(result.prompt, "Voice message recorded (3s)");
        assert!(result.is_voice_origin);
        assert_eq!(result.source, "fallback");
    }

    #[tokio::test]
    async fn test_blank_message_is_an_error() {
        let mut runner = runner(MockCareApi::new());
        assert!(runner.execute(SayInput::Text("   ".to_string())).await.is_err());
    }

    #[test]
    fn test_text_format_notes() {
        let runner = runner(MockCareApi::new());
        let result = NonInteractiveResult {
            prompt: "I feel lonely".to_string(),
            reply: "I'm here with you.".to_string(),
            source: "remote".to_string(),
            is_voice_origin: false,
            mood_score: Some(3),
            flagged_concern: Some(true),
            duration_ms: 12,
        };

        assert_eq!(
            runner.format_result(&result, OutputFormat::Text),
            "I'm here with you.\n\n(Mood: 3/10, Shared with your caregiver)"
        );

        let json: serde_json::Value =
            serde_json::from_str(&runner.format_result(&result, OutputFormat::Json)).unwrap();
        assert_eq!(json["source"], "remote");
        assert_eq!(json["mood_score"], 3);
    }
}
