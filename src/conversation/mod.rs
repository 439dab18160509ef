/// Conversation module - Gateway

mod controller;
mod fallback;
mod message;
mod quick_action;
mod voice;

pub use controller::{ChatOutcome, ConversationController, OutboundChat, ReplySource};
pub use fallback::fallback_reply;
pub use message::{Author, ConversationLog, Message, ReplyMeta};
pub use quick_action::QuickAction;
pub use voice::{RecorderState, VoiceRecorder};
