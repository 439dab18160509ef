use serde::{Deserialize, Serialize};

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Whatever the auth boundary answered. Success is decided by the presence of
/// `token`, never by the status code.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
    #[serde(default)]
    pub error: Option<String>,
}

/// The user-profile blob, persisted verbatim in the `user` slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default = "default_is_elder")]
    pub is_elder: bool,
    #[serde(default)]
    pub caregiver_id: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn default_is_elder() -> bool {
    true
}

/// Body of `POST /ai/chat`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

/// Successful answer of `POST /ai/chat`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub mood_score: Option<i64>,
    #[serde(default)]
    pub contains_concern: Option<bool>,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<u64>,
}

/// Answer of `GET /auth/profile`
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub user: UserProfile,
}

/// One stored exchange entry, as returned by `GET /conversations/{user_id}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConversationRecord {
    pub id: u64,
    pub user_id: u64,
    pub message_text: String,
    /// `user`, `ai` or `system`
    pub message_type: String,
    pub timestamp: String,
    #[serde(default)]
    pub mood_score: Option<i64>,
    #[serde(default)]
    pub contains_concern: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversationPage {
    #[serde(default)]
    pub conversations: Vec<ConversationRecord>,
    #[serde(default)]
    pub total: u64,
}

/// Body of `POST /conversations`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewConversationRecord {
    pub message_text: String,
    pub message_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood_score: Option<i64>,
    pub contains_concern: bool,
}

impl NewConversationRecord {
    /// A user-authored entry
    pub fn user_note(text: impl Into<String>) -> Self {
        Self {
            message_text: text.into(),
            message_type: "user".to_string(),
            mood_score: None,
            contains_concern: false,
        }
    }
}
