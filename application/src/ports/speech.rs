//! Speech capability ports
//!
//! Synthesis and recognition are platform capabilities that may simply not
//! exist. Both traits expose an explicit availability check, and callers take
//! the [`SpeechError::Unsupported`] path instead of probing ambient globals.

use async_trait::async_trait;
use chatnest_domain::{Utterance, Voice};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpeechError {
    #[error("Speech is not supported on this platform")]
    Unsupported,

    #[error("Speech failed: {0}")]
    Failed(String),
}

/// Text-to-speech capability
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn is_available(&self) -> bool;

    /// Voices the platform offers. May be empty right after start-up.
    async fn voices(&self) -> Vec<Voice>;

    /// Speak one utterance, returning once it has finished.
    async fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError>;
}

/// Single-shot speech-to-text capability
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    fn is_available(&self) -> bool;

    /// Listen for one phrase in `lang` and return its transcript.
    async fn listen_once(&self, lang: &str) -> Result<String, SpeechError>;
}

/// Stand-in for platforms without any speech support.
pub struct UnsupportedSpeech;

#[async_trait]
impl SpeechSynthesizer for UnsupportedSpeech {
    fn is_available(&self) -> bool {
        false
    }

    async fn voices(&self) -> Vec<Voice> {
        Vec::new()
    }

    async fn speak(&self, _utterance: &Utterance) -> Result<(), SpeechError> {
        Err(SpeechError::Unsupported)
    }
}

#[async_trait]
impl SpeechRecognizer for UnsupportedSpeech {
    fn is_available(&self) -> bool {
        false
    }

    async fn listen_once(&self, _lang: &str) -> Result<String, SpeechError> {
        Err(SpeechError::Unsupported)
    }
}
