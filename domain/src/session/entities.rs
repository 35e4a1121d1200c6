//! Session domain entities

use crate::core::error::DomainError;
use crate::util::truncate_chars;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix of every auto-generated session title.
pub const DEFAULT_TITLE_PREFIX: &str = "新聊天";

/// Maximum number of characters taken from the first user message.
pub const TITLE_CHAR_BUDGET: usize = 10;

/// Appended to a derived title when the user message was cut.
pub const TITLE_ELLIPSIS: &str = "...";

/// Greeting seeded into every new session.
pub const GREETING: &str = "宝贝你好呀！🌟 我是你的好朋友小星大姐姐。很高兴能陪你聊天！今天你遇到了什么好玩的事情吗？🌈";

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message in a conversation (Entity)
///
/// Assistant content grows by concatenation while a reply is streaming and
/// is left untouched once the stream completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default = "Message::new_id")]
    pub id: String,
    pub role: Role,
    #[serde(default)]
    pub content: String,
}

impl Message {
    /// Generate a fresh message identifier.
    pub fn new_id() -> String {
        Uuid::new_v4().simple().to_string()
    }

    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Self::new_id(),
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Empty assistant message that a streaming reply is appended to.
    pub fn assistant_placeholder() -> Self {
        Self::assistant(String::new())
    }

    pub fn append(&mut self, delta: &str) {
        self.content.push_str(delta);
    }
}

/// Parse a message sequence out of an untyped JSON payload.
///
/// The payload must be an array of message objects; anything else is
/// `InvalidInput`.
pub fn parse_message_list(value: &serde_json::Value) -> Result<Vec<Message>, DomainError> {
    if !value.is_array() {
        return Err(DomainError::InvalidInput(
            "messages must be an array".to_string(),
        ));
    }
    serde_json::from_value(value.clone())
        .map_err(|e| DomainError::InvalidInput(format!("malformed message: {e}")))
}

/// Current time as epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// One persisted conversation thread (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub updated_at: i64,
}

impl Session {
    /// Create a session seeded with the greeting, titled after `now`.
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            id: format!("session_{}", Uuid::new_v4().simple()),
            title: Self::default_title(now),
            messages: vec![Message::assistant(GREETING)],
            updated_at: now.timestamp_millis(),
        }
    }

    /// Auto-generated title, e.g. `新聊天 14:05`.
    pub fn default_title(now: DateTime<Local>) -> String {
        format!("{} {}", DEFAULT_TITLE_PREFIX, now.format("%H:%M"))
    }

    /// Whether the title is still the auto-generated one.
    pub fn has_default_title(&self) -> bool {
        self.title.starts_with(DEFAULT_TITLE_PREFIX)
    }

    /// Replace the whole message sequence.
    ///
    /// A default title is swapped for one derived from the first user
    /// message. A title that was already derived is never touched again.
    pub fn replace_messages(&mut self, messages: Vec<Message>, updated_at: i64) {
        self.messages = messages;
        self.updated_at = updated_at;

        if self.has_default_title()
            && let Some(first_user) = self.messages.iter().find(|m| m.role == Role::User)
        {
            self.title = derive_title(&first_user.content);
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            updated_at: self.updated_at,
        }
    }
}

/// Title derived from user content: first [`TITLE_CHAR_BUDGET`] characters,
/// plus [`TITLE_ELLIPSIS`] when cut.
pub fn derive_title(content: &str) -> String {
    let (head, truncated) = truncate_chars(content, TITLE_CHAR_BUDGET);
    if truncated {
        format!("{head}{TITLE_ELLIPSIS}")
    } else {
        head.to_string()
    }
}

/// Sidebar view of a session. Never carries the message sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    pub updated_at: i64,
}

/// Sort summaries newest first.
pub fn sort_newest_first(summaries: &mut [SessionSummary]) {
    summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}
