//! Port for structured conversation logging.
//!
//! Separate from `tracing`: tracing carries diagnostics, this port records
//! the transcript (what was asked, what came back, what was synced) in a
//! machine-readable form.

use chatnest_domain::util::preview;
use serde_json::{Value, json};

/// A structured conversation event.
pub struct ConversationEvent {
    /// Event type identifier (e.g. "user_message", "assistant_reply").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }

    pub fn user_message(session_id: &str, model: &str, content: &str) -> Self {
        Self::new(
            "user_message",
            json!({ "session_id": session_id, "model": model, "content": content }),
        )
    }

    pub fn assistant_reply(session_id: &str, model: &str, content: &str, streamed: bool) -> Self {
        Self::new(
            "assistant_reply",
            json!({
                "session_id": session_id,
                "model": model,
                "bytes": content.len(),
                "preview": preview(content, 80),
                "streamed": streamed,
            }),
        )
    }

    pub fn upstream_failure(session_id: &str, model: &str, error: &str) -> Self {
        Self::new(
            "upstream_failure",
            json!({ "session_id": session_id, "model": model, "error": error }),
        )
    }

    pub fn session_synced(session_id: &str, message_count: usize) -> Self {
        Self::new(
            "session_synced",
            json!({ "session_id": session_id, "messages": message_count }),
        )
    }
}

/// Port for logging conversation events.
///
/// `log` is synchronous and infallible: a broken transcript file must never
/// interrupt a conversation.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
