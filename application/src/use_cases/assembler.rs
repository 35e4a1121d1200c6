//! Streaming Response Assembler.
//!
//! Consumes the raw body of a streaming chat-completion response and yields
//! text deltas as they become available. Reads of any size are accepted;
//! the [`SseDecoder`] carries incomplete lines over between reads.
//!
//! The assembler suspends only while waiting for the next read. Everything
//! decodable from one read is decoded before it suspends again.

use crate::ports::chat_gateway::{ByteStream, GatewayError};
use chatnest_domain::{DecodedFrame, SseDecoder};
use futures::StreamExt;
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

/// How a stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    /// The `[DONE]` sentinel was received.
    Sentinel,
    /// The body closed without a sentinel.
    Closed,
    /// A read failed part-way. Text received before the failure is kept.
    Interrupted(GatewayError),
}

/// Summary of a finished assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyReport {
    pub end: StreamEnd,
    pub deltas: usize,
    /// Malformed frames that were dropped.
    pub skipped: usize,
}

/// Pull-based delta reader over a [`ByteStream`].
pub struct StreamAssembler {
    bytes: ByteStream,
    decoder: SseDecoder,
    pending: VecDeque<String>,
    end: Option<StreamEnd>,
    delivered: usize,
}

impl StreamAssembler {
    pub fn new(bytes: ByteStream) -> Self {
        Self {
            bytes,
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
            end: None,
            delivered: 0,
        }
    }

    /// Next text delta, or `None` once the stream has ended and every
    /// decoded delta has been handed out.
    pub async fn next_delta(&mut self) -> Option<String> {
        loop {
            if let Some(delta) = self.pending.pop_front() {
                self.delivered += 1;
                return Some(delta);
            }
            if self.end.is_some() {
                return None;
            }

            match self.bytes.next().await {
                Some(Ok(chunk)) => {
                    trace!("Stream: read {} bytes", chunk.len());
                    let frames = self.decoder.feed(&chunk);
                    self.absorb(frames);
                }
                Some(Err(e)) => {
                    warn!("Stream interrupted: {}", e);
                    let frames = self.decoder.finish();
                    self.absorb(frames);
                    self.end.get_or_insert(StreamEnd::Interrupted(e));
                }
                None => {
                    let frames = self.decoder.finish();
                    self.absorb(frames);
                    self.end.get_or_insert(StreamEnd::Closed);
                }
            }
        }
    }

    fn absorb(&mut self, frames: Vec<DecodedFrame>) {
        for frame in frames {
            match frame {
                DecodedFrame::Delta(text) => self.pending.push_back(text),
                DecodedFrame::Done => {
                    debug!("Stream: end sentinel received");
                    self.end = Some(StreamEnd::Sentinel);
                }
            }
        }
    }

    pub fn report(&self) -> Option<AssemblyReport> {
        self.end.clone().map(|end| AssemblyReport {
            end,
            deltas: self.delivered,
            skipped: self.decoder.skipped(),
        })
    }
}
