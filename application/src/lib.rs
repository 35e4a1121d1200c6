//! Application layer for chatnest
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ChatBehavior;
pub use ports::{
    chat_gateway::{ByteStream, ChatResponse, ChatTransport, DispatchTarget, GatewayError},
    chat_observer::{ChatObserver, NoChatObserver},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    local_mirror::{LocalMirror, MirrorError, NoLocalMirror},
    session_api::{LocalSessionApi, SessionApi, SessionApiError},
    speech::{SpeechError, SpeechRecognizer, SpeechSynthesizer, UnsupportedSpeech},
};
pub use use_cases::assembler::{AssemblyReport, StreamAssembler, StreamEnd};
pub use use_cases::chat_controller::{ChatController, ChatControllerError};
pub use use_cases::dispatcher::{Dispatch, DispatchError, ModelDispatcher};
pub use use_cases::session_service::SessionService;
pub use use_cases::speech_player::{SpeakOutcome, SpeechPlayer};
pub use use_cases::sync_scheduler::SyncScheduler;
