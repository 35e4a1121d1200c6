//! Streaming events for an assistant reply.
//!
//! [`StreamEvent`] is what the presentation layer sees while a reply is
//! assembled: a run of deltas followed by exactly one terminal event.

/// An event in a streamed assistant reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text chunk appended to the target message.
    Delta(String),
    /// The reply is complete; carries the full text.
    Completed(String),
    /// The request failed before any text arrived; carries the fallback
    /// text that replaced the reply.
    Failed(String),
}

impl StreamEvent {
    /// Returns the text content of any event.
    pub fn text(&self) -> &str {
        match self {
            StreamEvent::Delta(s) | StreamEvent::Completed(s) | StreamEvent::Failed(s) => s,
        }
    }

    /// Returns true if this event signals the end of the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Completed(_) | StreamEvent::Failed(_))
    }
}
