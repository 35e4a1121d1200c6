//! Speech synthesis through locally installed command-line engines.

mod command;

pub use command::{CommandSpeechSynthesizer, SpeechEngine};
