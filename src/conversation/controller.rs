use std::sync::Arc;
use tracing::{debug, warn};

use super::fallback::fallback_reply;
use super::message::{ConversationLog, Message, ReplyMeta};
use super::quick_action::QuickAction;
use super::voice::VoiceRecorder;
use crate::api::{CareApi, ChatReply};
use crate::constants::GREETING;
use crate::session::Session;
use crate::utils::CompanionError;

/// Where an assistant reply came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Remote,
    Fallback,
}

/// A chat request ready to go out, detached from the controller so the round
/// trip can run on its own task
pub struct OutboundChat {
    api: Arc<dyn CareApi>,
    token: String,
    text: String,
}

impl OutboundChat {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Perform the round trip. Never fails: errors travel inside the outcome.
    pub async fn dispatch(self) -> ChatOutcome {
        let result = self.api.chat(&self.text, &self.token).await;
        ChatOutcome {
            user_text: self.text,
            result,
        }
    }
}

/// Completion of an [`OutboundChat`], handed back to [`ConversationController::complete_send`]
#[derive(Debug)]
pub struct ChatOutcome {
    pub user_text: String,
    pub result: Result<ChatReply, CompanionError>,
}

/// Owns the conversation log and drives the send pipeline
pub struct ConversationController {
    api: Arc<dyn CareApi>,
    session: Session,
    log: ConversationLog,
    input: String,
    show_quick_actions: bool,
    awaiting_reply: bool,
    recorder: VoiceRecorder,
}

impl ConversationController {
    /// Start a conversation for `session`, seeded with the assistant greeting
    pub fn new(session: Session, api: Arc<dyn CareApi>) -> Self {
        let mut log = ConversationLog::new();
        log.push_assistant(GREETING, ReplyMeta::default());

        Self {
            api,
            session,
            log,
            input: String::new(),
            show_quick_actions: true,
            awaiting_reply: false,
            recorder: VoiceRecorder::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn messages(&self) -> &[Message] {
        self.log.messages()
    }

    /// The input buffer being composed
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    /// Shortcuts are offered until the first message is sent
    pub fn shows_quick_actions(&self) -> bool {
        self.show_quick_actions
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    pub fn recorder(&self) -> &VoiceRecorder {
        &self.recorder
    }

    /// Append the user's message and prepare the remote call
    ///
    /// Returns `None` for blank text, and while a previous reply is still
    /// pending so replies cannot interleave.
    pub fn begin_send(&mut self, text: &str, is_voice_origin: bool) -> Option<OutboundChat> {
        if text.trim().is_empty() {
            debug!("Ignoring empty message");
            return None;
        }
        if self.awaiting_reply {
            debug!("Ignoring message while a reply is pending");
            return None;
        }

        self.log.push_user(text, is_voice_origin);
        self.input.clear();
        self.show_quick_actions = false;
        self.awaiting_reply = true;

        Some(OutboundChat {
            api: Arc::clone(&self.api),
            token: self.session.token.clone(),
            text: text.to_string(),
        })
    }

    /// Append the assistant's reply: the service's when it answered, the local
    /// fallback otherwise
    pub fn complete_send(&mut self, outcome: ChatOutcome) -> ReplySource {
        self.awaiting_reply = false;

        let failure = match outcome.result {
            Ok(reply) if !reply.response.trim().is_empty() => {
                let meta = ReplyMeta::from_remote(reply.mood_score, reply.contains_concern);
                self.log.push_assistant(reply.response, meta);
                return ReplySource::Remote;
            }
            Ok(_) => CompanionError::ApiError("empty reply".to_string()),
            Err(e) => e,
        };

        warn!(error = %failure, "Chat service unavailable, answering locally");
        self.log
            .push_assistant(fallback_reply(&outcome.user_text), ReplyMeta::default());
        ReplySource::Fallback
    }

    /// Full send pipeline: append, call the service, append the reply
    pub async fn send_user_message(
        &mut self,
        text: &str,
        is_voice_origin: bool,
    ) -> Option<ReplySource> {
        let outbound = self.begin_send(text, is_voice_origin)?;
        let outcome = outbound.dispatch().await;
        Some(self.complete_send(outcome))
    }

    /// Send the input buffer as typed
    pub fn submit_input(&mut self) -> Option<OutboundChat> {
        let text = self.input.clone();
        self.begin_send(&text, false)
    }

    pub fn begin_quick_action(&mut self, action: QuickAction) -> Option<OutboundChat> {
        self.begin_send(action.phrase(), false)
    }

    pub async fn run_quick_action(&mut self, action: QuickAction) -> Option<ReplySource> {
        self.send_user_message(action.phrase(), false).await
    }

    pub fn start_recording(&mut self) {
        self.recorder.start();
    }

    /// Fold delivered timer ticks; returns the elapsed seconds
    pub fn poll_recording(&mut self) -> u64 {
        self.recorder.poll_ticks()
    }

    /// Stop recording and send the synthetic voice message
    ///
    /// While a reply is pending the recorder keeps running and `None` is
    /// returned, so the voice message is never dropped.
    pub fn stop_recording(&mut self) -> Option<OutboundChat> {
        if self.awaiting_reply {
            debug!("Reply pending, recording continues");
            return None;
        }
        let text = self.recorder.stop()?;
        self.begin_send(&text, true)
    }

    pub fn cancel_recording(&mut self) {
        self.recorder.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockCareApi, UserProfile};
    use crate::conversation::fallback::{DEFAULT_REPLY, MEDICATIONS_REPLY};
    use crate::conversation::Author;
    use std::time::Duration;

    fn session() -> Session {
        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "id": 1,
            "email": "mary@example.com",
            "full_name": "Mary Johnson"
        }))
        .unwrap();
        Session::new("jwt-abc", profile)
    }

    fn remote_reply(text: &str, mood: Option<i64>, concern: Option<bool>) -> ChatReply {
        ChatReply {
            response: text.to_string(),
            mood_score: mood,
            contains_concern: concern,
            intent: None,
            conversation_id: None,
        }
    }

    fn controller(api: MockCareApi) -> ConversationController {
        ConversationController::new(session(), Arc::new(api))
    }

    #[test]
    fn test_initial_greeting() {
        let chat = controller(MockCareApi::new());
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].author, Author::Assistant);
        assert_eq!(chat.messages()[0].text, GREETING);
        assert!(chat.shows_quick_actions());
    }

    #[tokio::test]
    async fn test_remote_reply() {
        let mut api = MockCareApi::new();
        api.expect_chat().times(1).returning(|message, token| {
            assert_eq!(message, "Good morning");
            assert_eq!(token, "jwt-abc");
            Ok(remote_reply("Good morning! How did you sleep?", Some(8), Some(false)))
        });
        let mut chat = controller(api);
        chat.input_mut().push_str("Good morning");

        let source = chat.send_user_message("Good morning", false).await;
        assert_eq!(source, Some(ReplySource::Remote));

        let messages = chat.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].author, Author::User);
        assert_eq!(messages[1].text, "Good morning");
        assert!(!messages[1].is_voice_origin);
        assert_eq!(messages[2].author, Author::Assistant);
        assert_eq!(messages[2].text, "Good morning! How did you sleep?");
        assert_eq!(messages[2].mood_score, Some(8));
        assert_eq!(messages[2].flagged_concern, Some(false));

        assert!(chat.input().is_empty());
        assert!(!chat.shows_quick_actions());
        assert!(!chat.is_awaiting_reply());
    }

    #[tokio::test]
    async fn test_failures_fall_back_locally() {
        let mut api = MockCareApi::new();
        let mut calls = 0;
        api.expect_chat().times(3).returning(move |_, _| {
            calls += 1;
            match calls {
                1 => Err(CompanionError::ApiError("500 Internal Server Error".into())),
                2 => Err(CompanionError::NetworkError("connection refused".into())),
                _ => Ok(remote_reply("   ", None, None)),
            }
        });
        let mut chat = controller(api);

        let source = chat.send_user_message("I need my pill for pain", false).await;
        assert_eq!(source, Some(ReplySource::Fallback));
        assert_eq!(chat.log().last().unwrap().text, MEDICATIONS_REPLY);
        assert_eq!(chat.log().last().unwrap().mood_score, None);

        let source = chat.send_user_message("Nice weather today", false).await;
        assert_eq!(source, Some(ReplySource::Fallback));
        assert_eq!(chat.log().last().unwrap().text, DEFAULT_REPLY);

        let source = chat.send_user_message("Tell me a story", false).await;
        assert_eq!(source, Some(ReplySource::Fallback));
        assert_eq!(chat.messages().len(), 7);
    }

    #[tokio::test]
    async fn test_each_send_adds_exactly_two_messages() {
        let mut api = MockCareApi::new();
        api.expect_chat()
            .returning(|message, _| Ok(remote_reply(&format!("You said: {message}"), None, None)));
        let mut chat = controller(api);

        for text in ["Hello", "  padded  ", "Show me my medications", "x"] {
            let before = chat.messages().len();
            chat.send_user_message(text, false).await.unwrap();
            assert_eq!(chat.messages().len(), before + 2);
            let messages = chat.messages();
            assert_eq!(messages[before].author, Author::User);
            assert_eq!(messages[before].text, text);
            assert_eq!(messages[before + 1].author, Author::Assistant);
        }
    }

    #[tokio::test]
    async fn test_blank_message_is_ignored() {
        // No expectations: the service must not be called
        let mut chat = controller(MockCareApi::new());
        chat.input_mut().push_str("   ");

        assert_eq!(chat.send_user_message("", false).await, None);
        assert_eq!(chat.send_user_message(" \t\n", false).await, None);
        assert!(chat.submit_input().is_none());
        assert_eq!(chat.messages().len(), 1);
        assert!(chat.shows_quick_actions());
    }

    #[tokio::test]
    async fn test_quick_action_uses_canonical_phrase() {
        let mut api = MockCareApi::new();
        api.expect_chat().times(1).returning(|message, _| {
            assert_eq!(message, "Show me my medications");
            Err(CompanionError::NetworkError("offline".into()))
        });
        let mut chat = controller(api);

        let source = chat.run_quick_action(QuickAction::Medications).await;
        assert_eq!(source, Some(ReplySource::Fallback));
        assert_eq!(chat.messages()[1].text, "Show me my medications");
        assert_eq!(chat.messages()[2].text, MEDICATIONS_REPLY);
        assert!(!chat.shows_quick_actions());
    }

    #[tokio::test]
    async fn test_sends_do_not_interleave() {
        let mut api = MockCareApi::new();
        api.expect_chat()
            .returning(|_, _| Ok(remote_reply("Noted.", None, None)));
        let mut chat = controller(api);

        let first = chat.begin_send("First", false).unwrap();
        assert!(chat.is_awaiting_reply());
        assert!(chat.begin_send("Second", false).is_none());
        assert!(chat.begin_quick_action(QuickAction::Mood).is_none());

        let outcome = first.dispatch().await;
        assert_eq!(outcome.user_text, "First");
        chat.complete_send(outcome);
        assert!(chat.begin_send("Second", false).is_some());

        let authors: Vec<Author> = chat.messages().iter().map(|m| m.author).collect();
        assert_eq!(
            authors,
            vec![Author::Assistant, Author::User, Author::Assistant, Author::User]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_voice_recording_sends_voice_message() {
        let mut api = MockCareApi::new();
        api.expect_chat().times(1).returning(|message, _| {
            assert_eq!(message, "Voice message recorded (3s)");
            Err(CompanionError::NetworkError("offline".into()))
        });
        let mut chat = controller(api);

        chat.start_recording();
        assert!(chat.recorder().is_recording());
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(chat.poll_recording(), 3);

        let outbound = chat.stop_recording().unwrap();
        assert!(outbound.text().contains("3s"));
        assert_eq!(chat.recorder().elapsed_secs(), 0);
        assert!(!chat.recorder().is_recording());

        let user_message = chat.log().last().unwrap();
        assert_eq!(user_message.author, Author::User);
        assert!(user_message.is_voice_origin);

        let outcome = outbound.dispatch().await;
        assert_eq!(chat.complete_send(outcome), ReplySource::Fallback);
        assert_eq!(chat.messages().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_recording_waits_for_pending_reply() {
        let mut api = MockCareApi::new();
        api.expect_chat()
            .returning(|_, _| Err(CompanionError::NetworkError("offline".into())));
        let mut chat = controller(api);

        let first = chat.begin_send("Hello", false).unwrap();
        chat.start_recording();
        tokio::time::sleep(Duration::from_millis(2500)).await;

        // The reply is still pending: nothing is sent and the recording goes on
        assert!(chat.stop_recording().is_none());
        assert!(chat.recorder().is_recording());
        assert_eq!(chat.poll_recording(), 2);

        let outcome = first.dispatch().await;
        chat.complete_send(outcome);
        assert_eq!(chat.messages().len(), 3);

        let outbound = chat.stop_recording().unwrap();
        assert_eq!(outbound.text(), "Voice message recorded (2s)");
        let user_message = chat.log().last().unwrap();
        assert_eq!(user_message.author, Author::User);
        assert!(user_message.is_voice_origin);
        assert_eq!(chat.messages().len(), 4);

        let outcome = outbound.dispatch().await;
        chat.complete_send(outcome);
        assert_eq!(chat.messages().len(), 5);
    }

    #[tokio::test]
    async fn test_cancelled_recording_sends_nothing() {
        let mut chat = controller(MockCareApi::new());
        chat.start_recording();
        chat.cancel_recording();
        assert!(chat.stop_recording().is_none());
        assert_eq!(chat.messages().len(), 1);
    }
}
