//! Chat observer port
//!
//! Defines how the presentation layer is told about conversation changes.

use chatnest_domain::{SessionSummary, StreamEvent};

/// Callback for conversation updates
///
/// Implementations live in the presentation layer (terminal, web UI, ...).
/// All methods have empty defaults so observers only implement what they
/// render.
pub trait ChatObserver: Send + Sync {
    /// Called for every delta and for the terminal event of a reply.
    fn on_stream_event(&self, _event: &StreamEvent) {}

    /// The visible conversation grew; keep the newest content in view.
    fn scroll_to_bottom(&self) {}

    /// The message list was replaced (session switch, new chat, delete).
    fn on_conversation_reset(&self) {}

    /// The session summary list was refreshed.
    fn on_sessions_refreshed(&self, _sessions: &[SessionSummary]) {}
}

/// No-op observer for when nothing is rendered
pub struct NoChatObserver;

impl ChatObserver for NoChatObserver {}
