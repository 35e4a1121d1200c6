//! Incremental decoder for `data: <json>` chat-completion streams.
//!
//! Upstream bytes arrive in reads of arbitrary size. A read may end in the
//! middle of a line, or in the middle of a multi-byte UTF-8 sequence, so
//! [`SseDecoder`] keeps the unterminated tail in a carry-over buffer and only
//! decodes complete lines.
//!
//! ```
//! use chatnest_domain::chat::sse::{DecodedFrame, SseDecoder};
//!
//! let mut decoder = SseDecoder::new();
//! let mut frames = decoder.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"hi\"}}]}\ndata: [DO");
//! frames.extend(decoder.feed(b"NE]\n"));
//! assert_eq!(frames, vec![DecodedFrame::Delta("hi".to_string()), DecodedFrame::Done]);
//! assert!(decoder.is_finished());
//! ```

use super::wire::ChatCompletionChunk;

/// Line prefix of a data frame.
pub const DATA_PREFIX: &str = "data: ";

/// Payload marking the end of the stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Result of decoding one complete line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedFrame {
    /// A non-empty text fragment from `choices[0].delta.content`.
    Delta(String),
    /// The `[DONE]` sentinel. Nothing after it is decoded.
    Done,
}

/// What a single line turned out to be.
#[derive(Debug, PartialEq, Eq)]
enum LineKind {
    Frame(DecodedFrame),
    /// Not a data line, or a data line without text (role-only deltas etc.)
    Ignored,
    /// A data line whose payload did not decode. Dropped, never fatal.
    Malformed,
}

/// Carry-over line decoder
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    finished: bool,
    skipped: usize,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the end sentinel has been seen or [`finish`](Self::finish) was called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Number of malformed data lines dropped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Feed one read worth of bytes and return the frames it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<DecodedFrame> {
        let mut frames = Vec::new();
        if self.finished {
            return frames;
        }
        self.buffer.extend_from_slice(chunk);

        let mut start = 0;
        while let Some(offset) = self.buffer[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            let kind = self.classify(start, end);
            start = end + 1;

            if self.push(kind, &mut frames) {
                self.buffer.clear();
                return frames;
            }
        }
        self.buffer.drain(..start);
        frames
    }

    /// Signal physical end of the stream.
    ///
    /// A final line without a trailing newline is still decoded.
    pub fn finish(&mut self) -> Vec<DecodedFrame> {
        let mut frames = Vec::new();
        if self.finished {
            return frames;
        }
        if !self.buffer.is_empty() {
            let kind = self.classify(0, self.buffer.len());
            self.push(kind, &mut frames);
        }
        self.buffer.clear();
        self.finished = true;
        frames
    }

    /// Returns true when the frame ends the stream.
    fn push(&mut self, kind: LineKind, frames: &mut Vec<DecodedFrame>) -> bool {
        match kind {
            LineKind::Frame(DecodedFrame::Done) => {
                frames.push(DecodedFrame::Done);
                self.finished = true;
                true
            }
            LineKind::Frame(frame) => {
                frames.push(frame);
                false
            }
            LineKind::Malformed => {
                self.skipped += 1;
                false
            }
            LineKind::Ignored => false,
        }
    }

    fn classify(&self, start: usize, end: usize) -> LineKind {
        let Ok(line) = std::str::from_utf8(&self.buffer[start..end]) else {
            return LineKind::Malformed;
        };
        decode_line(line.strip_suffix('\r').unwrap_or(line))
    }
}

fn decode_line(line: &str) -> LineKind {
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return LineKind::Ignored;
    };
    let payload = payload.trim();
    if payload == DONE_SENTINEL {
        return LineKind::Frame(DecodedFrame::Done);
    }
    match serde_json::from_str::<ChatCompletionChunk>(payload) {
        Ok(chunk) => match chunk.delta_content() {
            Some(content) => LineKind::Frame(DecodedFrame::Delta(content.to_string())),
            None => LineKind::Ignored,
        },
        Err(_) => LineKind::Malformed,
    }
}
