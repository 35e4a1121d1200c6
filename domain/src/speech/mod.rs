//! Text-to-speech policy.
//!
//! Pure decisions only: how a reply is cut into spoken sentences, which
//! voice is picked and how utterance parameters are bounded. The platform
//! capability that actually speaks lives behind an application port.

pub mod segment;
pub mod voice;

/// Language tag used for synthesis and recognition.
pub const SPEECH_LANG: &str = "zh-CN";

/// Phrase spoken by the voice test.
pub const TEST_PHRASE: &str = "你好呀宝贝，我是小星大姐姐，很高兴认识你！";
