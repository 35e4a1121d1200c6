//! Command-line speech synthesizer.
//!
//! Drives `say` (macOS) or `espeak-ng`, whichever is installed. When neither
//! is found the synthesizer reports itself unavailable and every call takes
//! the unsupported path.

use async_trait::async_trait;
use chatnest_application::ports::speech::{SpeechError, SpeechSynthesizer};
use chatnest_domain::{Utterance, Voice};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Words per minute at rate 1.0.
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// Supported speech engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechEngine {
    Say,
    EspeakNg,
}

impl SpeechEngine {
    pub fn program(self) -> &'static str {
        match self {
            SpeechEngine::Say => "say",
            SpeechEngine::EspeakNg => "espeak-ng",
        }
    }

    /// First engine found on `PATH`.
    pub fn detect() -> Option<Self> {
        [SpeechEngine::Say, SpeechEngine::EspeakNg]
            .into_iter()
            .find(|engine| which::which(engine.program()).is_ok())
    }

    fn list_args(self) -> &'static [&'static str] {
        match self {
            SpeechEngine::Say => &["-v", "?"],
            SpeechEngine::EspeakNg => &["--voices"],
        }
    }

    /// Parse the engine's voice listing.
    pub fn parse_voices(self, listing: &str) -> Vec<Voice> {
        match self {
            // `Ting-Ting           zh_CN    # 你好，我叫婷婷。`
            SpeechEngine::Say => listing
                .lines()
                .filter_map(|line| {
                    let spec = line.split('#').next()?.trim_end();
                    let (name, lang) = spec.rsplit_once(char::is_whitespace)?;
                    let name = name.trim();
                    (!name.is_empty()).then(|| Voice::new(name, lang))
                })
                .collect(),
            // ` 5  cmn   --/M   Chinese_(Mandarin)   sit/cmn   (zh 5)`
            SpeechEngine::EspeakNg => listing
                .lines()
                .skip(1)
                .filter_map(|line| {
                    let mut columns = line.split_whitespace();
                    let lang = columns.nth(1)?;
                    let name = columns.nth(1)?;
                    Some(Voice::new(name, normalize_lang(lang)))
                })
                .collect(),
        }
    }

    fn speak_args(self, utterance: &Utterance) -> Vec<String> {
        let words_per_minute = (BASE_WORDS_PER_MINUTE * utterance.rate).round() as u32;
        let mut args = Vec::new();
        match self {
            SpeechEngine::Say => {
                if let Some(voice) = &utterance.voice {
                    args.extend(["-v".to_string(), voice.clone()]);
                }
                args.extend(["-r".to_string(), words_per_minute.to_string()]);
            }
            SpeechEngine::EspeakNg => {
                let voice = utterance.voice.clone().unwrap_or_else(|| "cmn".to_string());
                let pitch = (50.0 * utterance.pitch).round().clamp(0.0, 99.0) as u32;
                let amplitude = (100.0 * utterance.volume).round().clamp(0.0, 200.0) as u32;
                args.extend([
                    "-v".to_string(),
                    voice,
                    "-s".to_string(),
                    words_per_minute.to_string(),
                    "-p".to_string(),
                    pitch.to_string(),
                    "-a".to_string(),
                    amplitude.to_string(),
                ]);
            }
        }
        // Sentences may start with `-` (list items)
        args.push("--".to_string());
        args.push(utterance.text.clone());
        args
    }
}

/// espeak-ng names Mandarin and Cantonese `cmn`/`yue`.
fn normalize_lang(lang: &str) -> String {
    match lang {
        "cmn" | "cmn-latn-pinyin" => "zh-CN".to_string(),
        "yue" => "zh-HK".to_string(),
        other => other.to_string(),
    }
}

/// [`SpeechSynthesizer`] backed by an external command.
pub struct CommandSpeechSynthesizer {
    engine: Option<SpeechEngine>,
}

impl CommandSpeechSynthesizer {
    /// Use whichever engine is installed.
    pub fn detect() -> Self {
        let engine = SpeechEngine::detect();
        match engine {
            Some(engine) => info!("Speech output via {}", engine.program()),
            None => debug!("No speech engine found, speech output disabled"),
        }
        Self { engine }
    }

    pub fn with_engine(engine: Option<SpeechEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> Option<SpeechEngine> {
        self.engine
    }
}

#[async_trait]
impl SpeechSynthesizer for CommandSpeechSynthesizer {
    fn is_available(&self) -> bool {
        self.engine.is_some()
    }

    async fn voices(&self) -> Vec<Voice> {
        let Some(engine) = self.engine else {
            return Vec::new();
        };
        let output = Command::new(engine.program())
            .args(engine.list_args())
            .stderr(Stdio::null())
            .output()
            .await;
        match output {
            Ok(output) if output.status.success() => {
                engine.parse_voices(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => {
                debug!("{} voice listing exited with {}", engine.program(), output.status);
                Vec::new()
            }
            Err(e) => {
                debug!("Could not list voices: {}", e);
                Vec::new()
            }
        }
    }

    async fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError> {
        let engine = self.engine.ok_or(SpeechError::Unsupported)?;
        // Dropping the future (playback stopped) kills the process
        let status = Command::new(engine.program())
            .args(engine.speak_args(utterance))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| SpeechError::Failed(format!("Failed to run {}: {}", engine.program(), e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(SpeechError::Failed(format!(
                "{} exited with {}",
                engine.program(),
                status
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatnest_domain::speech::segment::split_sentences;

    fn utterance(voice: Option<&str>) -> Utterance {
        Utterance {
            text: "你好呀".to_string(),
            lang: "zh-CN".to_string(),
            voice: voice.map(str::to_string),
            rate: 1.0,
            pitch: 1.2,
            volume: 1.0,
        }
    }

    #[test]
    fn parses_say_listing() {
        let listing = "Alex                en_US    # Most people recognize me by my voice.\n\
                       Ting-Ting           zh_CN    # 你好，我叫婷婷。\n\
                       Mei-Jia (Enhanced)  zh_TW    # 你好，我叫美佳。\n";
        let voices = SpeechEngine::Say.parse_voices(listing);
        assert_eq!(
            voices,
            vec![
                Voice::new("Alex", "en_US"),
                Voice::new("Ting-Ting", "zh_CN"),
                Voice::new("Mei-Jia (Enhanced)", "zh_TW"),
            ]
        );
    }

    #[test]
    fn parses_espeak_listing() {
        let listing = "Pty Language       Age/Gender VoiceName          File                 Other Languages\n \
                       5  cmn             --/M      Chinese_(Mandarin) sit/cmn              (zh-cmn 5)(zh 5)\n \
                       5  en-us           --/M      English_(America)  gmw/en-US            (en 3)\n";
        let voices = SpeechEngine::EspeakNg.parse_voices(listing);
        assert_eq!(
            voices,
            vec![
                Voice::new("Chinese_(Mandarin)", "zh-CN"),
                Voice::new("English_(America)", "en-us"),
            ]
        );
    }

    #[test]
    fn say_arguments() {
        let args = SpeechEngine::Say.speak_args(&utterance(Some("Ting-Ting")));
        assert_eq!(args, ["-v", "Ting-Ting", "-r", "175", "--", "你好呀"]);
    }

    #[test]
    fn espeak_arguments_scale_pitch_and_volume() {
        let args = SpeechEngine::EspeakNg.speak_args(&utterance(None));
        assert_eq!(
            args,
            ["-v", "cmn", "-s", "175", "-p", "60", "-a", "100", "--", "你好呀"]
        );
    }

    #[test]
    fn dash_led_sentence_is_not_an_option() {
        let sentences = split_sentences("- 恐龙很大。- 恐龙吃草。");
        assert_eq!(sentences[0], "- 恐龙很大");
        for engine in [SpeechEngine::Say, SpeechEngine::EspeakNg] {
            let mut spoken = utterance(None);
            spoken.text = sentences[0].clone();
            let args = engine.speak_args(&spoken);
            let split = args.len() - 2;
            assert_eq!(args[split], "--", "{engine:?}");
            assert_eq!(args[split + 1], "- 恐龙很大", "{engine:?}");
        }
    }

    #[tokio::test]
    async fn missing_engine_is_unsupported() {
        let synth = CommandSpeechSynthesizer::with_engine(None);
        assert!(!synth.is_available());
        assert!(synth.voices().await.is_empty());
        assert_eq!(synth.speak(&utterance(None)).await, Err(SpeechError::Unsupported));
    }
}
