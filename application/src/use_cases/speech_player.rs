//! Speech Player use case.
//!
//! Reads assistant messages aloud one sentence at a time and runs
//! single-shot voice input. Both depend on platform capabilities that may
//! be missing; every entry point checks availability first and reports
//! [`SpeechError::Unsupported`] instead of failing later.

use crate::ports::speech::{SpeechError, SpeechRecognizer, SpeechSynthesizer};
use chatnest_domain::speech::segment::{split_sentences, strip_emoji};
use chatnest_domain::speech::voice::{candidate_voices, preferred_voice};
use chatnest_domain::speech::{SPEECH_LANG, TEST_PHRASE};
use chatnest_domain::{Utterance, Voice, VoiceSettings};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Pause between consecutive sentences.
pub const SENTENCE_GAP: Duration = Duration::from_millis(200);

/// What a call to [`SpeechPlayer::speak`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeakOutcome {
    /// Playback of the message started with this many sentences.
    Started { sentences: usize },
    /// The message was already playing and has been stopped.
    Stopped,
    /// Nothing speakable was left after stripping emoji.
    Empty,
}

struct Playback {
    message_id: String,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Playback {
    fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

pub struct SpeechPlayer {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    recognizer: Arc<dyn SpeechRecognizer>,
    settings: VoiceSettings,
    voices: Vec<Voice>,
    gap: Duration,
    current: Option<Playback>,
}

impl SpeechPlayer {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        recognizer: Arc<dyn SpeechRecognizer>,
        settings: VoiceSettings,
    ) -> Self {
        Self {
            synthesizer,
            recognizer,
            settings,
            voices: Vec::new(),
            gap: SENTENCE_GAP,
            current: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.synthesizer.is_available()
    }

    pub fn can_listen(&self) -> bool {
        self.recognizer.is_available()
    }

    pub fn settings(&self) -> &VoiceSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut VoiceSettings {
        &mut self.settings
    }

    /// Id of the message being spoken, if playback is still running.
    pub fn speaking(&self) -> Option<&str> {
        self.current
            .as_ref()
            .filter(|p| p.is_active())
            .map(|p| p.message_id.as_str())
    }

    /// Chinese voices usable for playback. Picks a default voice the first
    /// time candidates show up.
    pub async fn load_voices(&mut self) -> Result<&[Voice], SpeechError> {
        if !self.is_available() {
            return Err(SpeechError::Unsupported);
        }
        self.voices = candidate_voices(&self.synthesizer.voices().await);
        if self.settings.selected_voice.is_empty()
            && let Some(voice) = preferred_voice(&self.voices)
        {
            debug!("Selected voice {}", voice.name);
            self.settings.selected_voice = voice.name.clone();
        }
        Ok(&self.voices)
    }

    /// Toggle playback of `text` as message `message_id`.
    ///
    /// Speaking the message that is already playing stops it. Speaking a
    /// different message cancels the current one first.
    pub async fn speak(&mut self, text: &str, message_id: &str) -> Result<SpeakOutcome, SpeechError> {
        if !self.is_available() {
            return Err(SpeechError::Unsupported);
        }

        if let Some(playing) = self.speaking().map(str::to_string) {
            self.stop();
            if playing == message_id {
                return Ok(SpeakOutcome::Stopped);
            }
        }

        let sentences = split_sentences(&strip_emoji(text));
        if sentences.is_empty() {
            return Ok(SpeakOutcome::Empty);
        }
        if self.voices.is_empty() {
            self.load_voices().await?;
        }

        let utterances: Vec<Utterance> = sentences
            .iter()
            .map(|s| self.settings.utterance(s.as_str(), &self.voices))
            .collect();
        let count = utterances.len();
        debug!("Speaking message {} in {} sentences", message_id, count);

        let cancel = CancellationToken::new();
        let task = tokio::spawn(play(
            Arc::clone(&self.synthesizer),
            utterances,
            self.gap,
            cancel.clone(),
        ));
        self.current = Some(Playback {
            message_id: message_id.to_string(),
            cancel,
            task,
        });
        Ok(SpeakOutcome::Started { sentences: count })
    }

    /// Stop playback. Safe to call when nothing is playing.
    pub fn stop(&mut self) {
        if let Some(playback) = self.current.take() {
            playback.cancel.cancel();
        }
    }

    /// Wait until the current playback has finished.
    pub async fn wait(&mut self) {
        if let Some(playback) = self.current.take()
            && let Err(e) = playback.task.await
        {
            warn!("Speech task failed: {}", e);
        }
    }

    /// Speak the fixed test phrase with the current settings.
    pub async fn test_voice(&mut self) -> Result<SpeakOutcome, SpeechError> {
        self.speak(TEST_PHRASE, "voice-test").await
    }

    /// Listen for a single phrase.
    pub async fn listen(&self) -> Result<String, SpeechError> {
        if !self.can_listen() {
            return Err(SpeechError::Unsupported);
        }
        self.recognizer.listen_once(SPEECH_LANG).await
    }
}

impl Drop for SpeechPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn play(
    synthesizer: Arc<dyn SpeechSynthesizer>,
    utterances: Vec<Utterance>,
    gap: Duration,
    cancel: CancellationToken,
) {
    for (i, utterance) in utterances.iter().enumerate() {
        if i > 0 {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(gap) => {}
            }
        }
        tokio::select! {
            _ = cancel.cancelled() => return,
            result = synthesizer.speak(utterance) => {
                if let Err(e) = result {
                    warn!("Speech synthesis failed: {}", e);
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::speech::UnsupportedSpeech;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records spoken text; each utterance takes `per_sentence` to speak.
    struct RecordingSynth {
        spoken: Mutex<Vec<Utterance>>,
        per_sentence: Duration,
    }

    impl RecordingSynth {
        fn new(per_sentence: Duration) -> Arc<Self> {
            Arc::new(Self {
                spoken: Mutex::new(Vec::new()),
                per_sentence,
            })
        }

        fn texts(&self) -> Vec<String> {
            self.spoken
                .lock()
                .unwrap()
                .iter()
                .map(|u| u.text.clone())
                .collect()
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for RecordingSynth {
        fn is_available(&self) -> bool {
            true
        }

        async fn voices(&self) -> Vec<Voice> {
            vec![
                Voice::new("Microsoft Yunxi Online", "zh-CN"),
                Voice::new("Microsoft Xiaoxiao Online", "zh-CN"),
                Voice::new("Samantha", "en-US"),
            ]
        }

        async fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError> {
            self.spoken.lock().unwrap().push(utterance.clone());
            tokio::time::sleep(self.per_sentence).await;
            Ok(())
        }
    }

    fn player(synth: Arc<RecordingSynth>) -> SpeechPlayer {
        SpeechPlayer::new(synth, Arc::new(UnsupportedSpeech), VoiceSettings::default())
    }

    #[tokio::test(start_paused = true)]
    async fn speaks_sentences_in_order_without_emoji() {
        let synth = RecordingSynth::new(Duration::from_millis(100));
        let mut player = player(synth.clone());

        let outcome = player.speak("宝贝你好呀！🌟 今天开心吗？", "m1").await.unwrap();
        assert_eq!(outcome, SpeakOutcome::Started { sentences: 2 });
        assert_eq!(player.speaking(), Some("m1"));

        player.wait().await;
        assert_eq!(synth.texts(), ["宝贝你好呀", "今天开心吗"]);

        let first = &synth.spoken.lock().unwrap()[0];
        assert_eq!(first.voice.as_deref(), Some("Microsoft Xiaoxiao Online"));
        assert_eq!(first.lang, "zh-CN");
        assert_eq!(first.rate, 0.9);
        assert_eq!(first.pitch, 1.2);
    }

    #[tokio::test(start_paused = true)]
    async fn speaking_same_message_toggles_off() {
        let synth = RecordingSynth::new(Duration::from_secs(1));
        let mut player = player(synth.clone());

        player.speak("第一句。第二句。第三句。", "m1").await.unwrap();
        tokio::task::yield_now().await;
        let outcome = player.speak("第一句。第二句。第三句。", "m1").await.unwrap();
        assert_eq!(outcome, SpeakOutcome::Stopped);
        assert_eq!(player.speaking(), None);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(synth.texts(), ["第一句"]);
    }

    #[tokio::test(start_paused = true)]
    async fn speaking_other_message_replaces_current() {
        let synth = RecordingSynth::new(Duration::from_secs(1));
        let mut player = player(synth.clone());

        player.speak("一。二。三。", "m1").await.unwrap();
        tokio::task::yield_now().await;
        let outcome = player.speak("四", "m2").await.unwrap();
        assert_eq!(outcome, SpeakOutcome::Started { sentences: 1 });
        assert_eq!(player.speaking(), Some("m2"));

        player.wait().await;
        assert_eq!(synth.texts(), ["一", "四"]);
    }

    #[tokio::test(start_paused = true)]
    async fn emoji_only_text_is_empty() {
        let synth = RecordingSynth::new(Duration::ZERO);
        let mut player = player(synth.clone());
        assert_eq!(player.speak("🌈🌟", "m1").await.unwrap(), SpeakOutcome::Empty);
        assert!(synth.texts().is_empty());
    }

    #[tokio::test]
    async fn load_voices_picks_preferred_default() {
        let mut player = player(RecordingSynth::new(Duration::ZERO));
        let names: Vec<_> = player
            .load_voices()
            .await
            .unwrap()
            .iter()
            .map(|v| v.name.clone())
            .collect();
        assert_eq!(names, ["Microsoft Yunxi Online", "Microsoft Xiaoxiao Online"]);
        assert_eq!(player.settings().selected_voice, "Microsoft Xiaoxiao Online");
    }

    #[tokio::test]
    async fn unsupported_platform_reports_unsupported() {
        let mut player = SpeechPlayer::new(
            Arc::new(UnsupportedSpeech),
            Arc::new(UnsupportedSpeech),
            VoiceSettings::default(),
        );
        assert!(!player.is_available());
        assert_eq!(player.speak("你好", "m1").await, Err(SpeechError::Unsupported));
        assert_eq!(player.test_voice().await, Err(SpeechError::Unsupported));
        assert_eq!(player.listen().await, Err(SpeechError::Unsupported));
    }
}
