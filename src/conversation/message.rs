use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::constants::{MOOD_SCORE_MAX, MOOD_SCORE_MIN};

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Assistant,
}

/// Represents a chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub author: Author,
    pub text: String,
    pub timestamp: DateTime<Local>,
    /// 1-10, only ever set on replies from the service
    pub mood_score: Option<u8>,
    pub flagged_concern: Option<bool>,
    pub is_voice_origin: bool,
}

/// Optional fields a reply may carry
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReplyMeta {
    pub mood_score: Option<u8>,
    pub flagged_concern: Option<bool>,
}

impl ReplyMeta {
    /// Keep a boundary-supplied mood score only if it is on the 1-10 scale
    pub fn from_remote(mood_score: Option<i64>, contains_concern: Option<bool>) -> Self {
        let mood_score = mood_score
            .and_then(|score| u8::try_from(score).ok())
            .filter(|score| (MOOD_SCORE_MIN..=MOOD_SCORE_MAX).contains(score));

        Self {
            mood_score,
            flagged_concern: contains_concern,
        }
    }
}

/// Ordered, append-only record of the exchange
#[derive(Debug, Clone)]
pub struct ConversationLog {
    messages: Vec<Message>,
    next_id: u64,
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationLog {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            next_id: 1,
        }
    }

    /// Append a message written by the user
    pub fn push_user(&mut self, text: impl Into<String>, is_voice_origin: bool) -> &Message {
        self.push(Author::User, text.into(), ReplyMeta::default(), is_voice_origin)
    }

    /// Append a message written by the assistant
    pub fn push_assistant(&mut self, text: impl Into<String>, meta: ReplyMeta) -> &Message {
        self.push(Author::Assistant, text.into(), meta, false)
    }

    fn push(&mut self, author: Author, text: String, meta: ReplyMeta, is_voice_origin: bool) -> &Message {
        let id = self.next_id;
        self.next_id += 1;

        self.messages.push(Message {
            id,
            author,
            text,
            timestamp: Local::now(),
            mood_score: meta.mood_score,
            flagged_concern: meta.flagged_concern,
            is_voice_origin,
        });

        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
