//! Client-local mirror port
//!
//! A non-authoritative cache on the client: the last message sequence seen
//! and the user's API keys. The Session Service stays the source of truth;
//! the mirror only fills in when the server cannot be reached.

use chatnest_domain::Message;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Mirror I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mirror data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Persisted client-local state
pub trait LocalMirror: Send + Sync {
    /// Last-seen message sequence, `None` when nothing usable is stored.
    fn load_history(&self) -> Option<Vec<Message>>;

    fn save_history(&self, messages: &[Message]) -> Result<(), MirrorError>;

    /// Per-model API keys keyed by model identifier.
    fn load_api_keys(&self) -> HashMap<String, String>;

    fn save_api_keys(&self, keys: &HashMap<String, String>) -> Result<(), MirrorError>;
}

/// Mirror that remembers nothing.
pub struct NoLocalMirror;

impl LocalMirror for NoLocalMirror {
    fn load_history(&self) -> Option<Vec<Message>> {
        None
    }

    fn save_history(&self, _messages: &[Message]) -> Result<(), MirrorError> {
        Ok(())
    }

    fn load_api_keys(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    fn save_api_keys(&self, _keys: &HashMap<String, String>) -> Result<(), MirrorError> {
        Ok(())
    }
}
