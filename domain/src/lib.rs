//! Domain layer for chatnest
//!
//! This crate contains the core entities, value objects and pure logic.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Session
//!
//! A session is one conversation thread: an ordered list of messages plus a
//! title. The title starts out auto-generated and is replaced once by the
//! first user message.
//!
//! ## Streaming
//!
//! Replies arrive as `data: <json>` frames. [`SseDecoder`] turns raw reads
//! into text deltas, carrying incomplete lines over between reads.

pub mod chat;
pub mod core;
pub mod providers;
pub mod session;
pub mod speech;
pub mod util;

// Re-export commonly used types
pub use chat::{
    sse::{DecodedFrame, SseDecoder},
    stream::StreamEvent,
    wire::{ChatCompletion, ChatCompletionChunk, ChatRequest, WireMessage},
};
pub use core::error::DomainError;
pub use providers::{AuthScheme, ModelCatalog, ModelConfig, ProxyRoute, Route};
pub use session::{
    entities::{Message, Role, Session, SessionSummary},
    repository::SessionStore,
};
pub use speech::voice::{Utterance, Voice, VoiceSettings};
