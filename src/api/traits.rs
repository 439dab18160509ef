use async_trait::async_trait;

use super::types::{ChatReply, ConversationPage, LoginResponse, NewConversationRecord, UserProfile};
use crate::utils::CompanionError;

/// The remote companion service, seen from the client
///
/// Transport failures come back as `NetworkError`, non-success answers as
/// `ApiError`. `login` is the exception: any readable body is returned so the
/// caller can decide on the presence of a token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CareApi: Send + Sync {
    /// `POST /auth/login`
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, CompanionError>;

    /// `GET /auth/profile`
    async fn profile(&self, token: &str) -> Result<UserProfile, CompanionError>;

    /// `POST /ai/chat`
    async fn chat(&self, message: &str, token: &str) -> Result<ChatReply, CompanionError>;

    /// `GET /conversations/{user_id}`
    async fn conversations(
        &self,
        user_id: u64,
        token: &str,
        limit: usize,
    ) -> Result<ConversationPage, CompanionError>;

    /// `POST /conversations`
    async fn record_message(
        &self,
        record: &NewConversationRecord,
        token: &str,
    ) -> Result<(), CompanionError>;

    /// Base URL, for status output
    fn endpoint(&self) -> String;
}
