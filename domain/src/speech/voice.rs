//! Voice selection and utterance parameters.

use serde::{Deserialize, Serialize};

/// A synthesis voice offered by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    pub lang: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }

    fn is_chinese(&self) -> bool {
        self.lang.contains("zh") || self.lang.contains("CN")
    }
}

/// Name fragments tried in order when no voice has been chosen yet.
const PREFERRED_VOICES: [&str; 5] = ["Xiaoxiao", "Meijia", "甜美", "温柔", "Online"];

/// Chinese voices, narrowed to online voices when any exist.
pub fn candidate_voices(voices: &[Voice]) -> Vec<Voice> {
    let online: Vec<Voice> = voices
        .iter()
        .filter(|v| v.is_chinese() && v.name.contains("Online"))
        .cloned()
        .collect();
    if !online.is_empty() {
        return online;
    }
    voices.iter().filter(|v| v.is_chinese()).cloned().collect()
}

/// Pick the default voice among candidates.
pub fn preferred_voice(candidates: &[Voice]) -> Option<&Voice> {
    PREFERRED_VOICES
        .iter()
        .find_map(|fragment| candidates.iter().find(|v| v.name.contains(fragment)))
        .or_else(|| candidates.first())
}

/// User-adjustable voice settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    /// Empty until a voice is chosen.
    pub selected_voice: String,
    pub pitch: f32,
    pub rate: f32,
    pub volume: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            selected_voice: String::new(),
            pitch: 1.2,
            rate: 0.9,
            volume: 1.0,
        }
    }
}

/// Parameters of one spoken sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub lang: String,
    pub voice: Option<String>,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

fn or_default(value: f32, default: f32) -> f32 {
    if value == 0.0 || value.is_nan() { default } else { value }
}

impl VoiceSettings {
    /// Build an utterance, falling back to defaults for unset values and
    /// clamping pitch to 0.8..=1.5 and rate to 0.7..=1.3.
    pub fn utterance(&self, text: impl Into<String>, available: &[Voice]) -> Utterance {
        let voice = available
            .iter()
            .find(|v| v.name == self.selected_voice)
            .map(|v| v.name.clone());
        Utterance {
            text: text.into(),
            lang: super::SPEECH_LANG.to_string(),
            voice,
            rate: or_default(self.rate, 0.9).clamp(0.7, 1.3),
            pitch: or_default(self.pitch, 1.2).clamp(0.8, 1.5),
            volume: or_default(self.volume, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voices() -> Vec<Voice> {
        vec![
            Voice::new("Microsoft Yunxi Online", "zh-CN"),
            Voice::new("Microsoft Xiaoxiao Online", "zh-CN"),
            Voice::new("Google US English", "en-US"),
            Voice::new("Ting-Ting", "zh-CN"),
        ]
    }

    #[test]
    fn candidates_prefer_online_chinese_voices() {
        let names: Vec<_> = candidate_voices(&voices())
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(names, ["Microsoft Yunxi Online", "Microsoft Xiaoxiao Online"]);
    }

    #[test]
    fn candidates_fall_back_to_any_chinese_voice() {
        let offline = vec![Voice::new("Ting-Ting", "zh-CN"), Voice::new("Alex", "en-US")];
        let names: Vec<_> = candidate_voices(&offline).into_iter().map(|v| v.name).collect();
        assert_eq!(names, ["Ting-Ting"]);
    }

    #[test]
    fn preferred_voice_order() {
        let candidates = candidate_voices(&voices());
        assert_eq!(
            preferred_voice(&candidates).unwrap().name,
            "Microsoft Xiaoxiao Online"
        );

        let plain = vec![Voice::new("A", "zh-CN"), Voice::new("B", "zh-CN")];
        assert_eq!(preferred_voice(&plain).unwrap().name, "A");
        assert!(preferred_voice(&[]).is_none());
    }

    #[test]
    fn utterance_clamps_parameters() {
        let settings = VoiceSettings {
            selected_voice: "Ting-Ting".to_string(),
            pitch: 3.0,
            rate: 0.1,
            volume: 0.5,
        };
        let utterance = settings.utterance("你好", &voices());
        assert_eq!(utterance.voice.as_deref(), Some("Ting-Ting"));
        assert_eq!(utterance.lang, "zh-CN");
        assert_eq!(utterance.pitch, 1.5);
        assert_eq!(utterance.rate, 0.7);
        assert_eq!(utterance.volume, 0.5);
    }

    #[test]
    fn utterance_defaults_for_unset_values() {
        let settings = VoiceSettings {
            selected_voice: "missing".to_string(),
            pitch: 0.0,
            rate: 0.0,
            volume: 0.0,
        };
        let utterance = settings.utterance("x", &voices());
        assert_eq!(utterance.voice, None);
        assert_eq!(utterance.pitch, 1.2);
        assert_eq!(utterance.rate, 0.9);
        assert_eq!(utterance.volume, 1.0);
    }
}
