//! Sentence segmentation for speech output.

/// Characters that end a spoken sentence.
const SENTENCE_ENDS: [char; 3] = ['。', '！', '？'];

/// Emoji blocks removed before speaking.
const EMOJI_RANGES: [(u32, u32); 6] = [
    (0x1F600, 0x1F64F),
    (0x1F300, 0x1F5FF),
    (0x1F680, 0x1F6FF),
    (0x1F1E6, 0x1F1FF),
    (0x2600, 0x26FF),
    (0x2700, 0x27BF),
];

fn is_emoji(c: char) -> bool {
    let cp = c as u32;
    EMOJI_RANGES.iter().any(|&(lo, hi)| (lo..=hi).contains(&cp))
}

pub fn strip_emoji(text: &str) -> String {
    text.chars().filter(|&c| !is_emoji(c)).collect()
}

/// Emoji-free, trimmed, non-empty sentences in speaking order.
pub fn split_sentences(text: &str) -> Vec<String> {
    strip_emoji(text)
        .split(SENTENCE_ENDS)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
