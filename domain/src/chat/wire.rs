//! Chat-completion payloads.
//!
//! Only the fields the client reads or writes are modelled. Unknown fields
//! in upstream responses are ignored.

use crate::session::entities::{Message, Role};
use serde::{Deserialize, Serialize};

/// A `{role, content}` pair as sent upstream. Carries no message id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

impl From<&Message> for WireMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

/// Request body for `POST .../chat/completions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub stream: bool,
}

impl ChatRequest {
    /// Build a request: system prompt first, then the history in order.
    pub fn new(
        model: impl Into<String>,
        system_prompt: &str,
        history: &[Message],
        stream: bool,
    ) -> Self {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(WireMessage {
            role: Role::System,
            content: system_prompt.to_string(),
        });
        messages.extend(history.iter().map(WireMessage::from));
        Self {
            model: model.into(),
            messages,
            stream,
        }
    }
}

/// One streamed frame: `{"choices":[{"delta":{"content":"..."}}]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionChunk {
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkChoice {
    pub delta: ChunkDelta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionChunk {
    /// Text carried by `choices[0].delta.content`, if any.
    pub fn delta_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.delta.content.as_deref())
            .filter(|s| !s.is_empty())
    }
}

/// Non-streaming response: `{"choices":[{"message":{"content":"..."}}]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletion {
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice {
    pub message: CompletionMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletion {
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_puts_system_prompt_first_and_drops_ids() {
        let history = vec![Message::assistant("hello"), Message::user("hi")];
        let request = ChatRequest::new("deepseek-chat", "be kind", &history, true);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "deepseek-chat");
        assert_eq!(json["stream"], true);

        let messages = json["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], "be kind");
        assert_eq!(messages[2]["role"], "user");
        for m in messages {
            let keys: Vec<_> = m.as_object().unwrap().keys().cloned().collect();
            assert_eq!(keys, ["content", "role"]);
        }
    }

    #[test]
    fn chunk_delta_content() {
        let chunk: ChatCompletionChunk =
            serde_json::from_str(r#"{"id":"x","choices":[{"index":0,"delta":{"content":"你"}}]}"#)
                .unwrap();
        assert_eq!(chunk.delta_content(), Some("你"));
    }

    #[test]
    fn chunk_without_content_yields_none() {
        let chunk: ChatCompletionChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#).unwrap();
        assert_eq!(chunk.delta_content(), None);

        let chunk: ChatCompletionChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{"content":null}}]}"#).unwrap();
        assert_eq!(chunk.delta_content(), None);

        let chunk: ChatCompletionChunk = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(chunk.delta_content(), None);
    }

    #[test]
    fn completion_content() {
        let completion: ChatCompletion =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":"好的"}}]}"#)
                .unwrap();
        assert_eq!(completion.content(), Some("好的"));
    }
}
