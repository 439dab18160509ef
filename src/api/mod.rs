// Gateway module for the companion service boundary - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod client;
mod traits;
mod types;

// Public re-exports - the ONLY way to access api functionality
pub use client::HttpCareApi;
pub use traits::CareApi;
#[cfg(test)]
pub use traits::MockCareApi;
pub use types::{
    ChatReply, ConversationPage, ConversationRecord, LoginResponse, NewConversationRecord,
    UserProfile,
};
