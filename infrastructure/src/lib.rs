//! Infrastructure layer for chatnest
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod http;
pub mod logging;
pub mod mirror;
pub mod speech;
pub mod store;

// Re-export commonly used types
pub use config::{ConfigLoader, ConfigValidationError, FileConfig};
pub use http::{HttpSessionApi, ReqwestChatTransport, SessionClientError};
pub use logging::JsonlConversationLogger;
pub use mirror::JsonFileMirror;
pub use speech::{CommandSpeechSynthesizer, SpeechEngine};
pub use store::InMemorySessionStore;
