//! Application-level configuration.
//!
//! Controls how the chat use cases behave: prompts, fallback text and the
//! timing of persistence and reply pacing.

use std::time::Duration;

/// Persona prompt prepended to every upstream request.
pub const DEFAULT_SYSTEM_PROMPT: &str = "你是一个温柔、博学且充满童心的 AI 大姐姐。你的名字叫'小星'，主要陪伴一位3岁的女孩聊天。请使用生动有趣的语言，多用表情符号，严禁输出任何暴力、负面或不适合儿童的内容。如果她问到深奥的科学问题，请用简单的比喻来解释。";

/// Reply shown in place of the assistant's answer when a request fails.
pub const FALLBACK_REPLY: &str = "哎呀，小星姐姐现在有点累了，让我休息一下再陪你聊天吧～😴";

/// Quiescence window of the sync debounce.
pub const DEFAULT_SYNC_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Chat behavior configuration.
#[derive(Debug, Clone)]
pub struct ChatBehavior {
    pub system_prompt: String,
    pub fallback_reply: String,
    /// Model selected at start-up.
    pub default_model: String,
    pub sync_debounce: Duration,
    /// Per-character delay when replaying a non-streamed reply. `None`
    /// delivers the whole reply at once.
    pub typewriter_delay: Option<Duration>,
}

impl Default for ChatBehavior {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            fallback_reply: FALLBACK_REPLY.to_string(),
            default_model: "deepseek-chat".to_string(),
            sync_debounce: DEFAULT_SYNC_DEBOUNCE,
            typewriter_delay: None,
        }
    }
}

impl ChatBehavior {
    pub fn with_sync_debounce_ms(mut self, millis: u64) -> Self {
        self.sync_debounce = Duration::from_millis(millis);
        self
    }

    /// `0` turns the typewriter off.
    pub fn with_typewriter_delay_ms(mut self, millis: u64) -> Self {
        self.typewriter_delay = (millis > 0).then(|| Duration::from_millis(millis));
        self
    }
}
