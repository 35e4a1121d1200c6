//! Chat-completion wire protocol and incremental stream decoding.
//!
//! - [`wire`]: request/response payloads of OpenAI-compatible endpoints
//! - [`sse`]: line-buffered decoder for `data: <json>` frames
//! - [`stream::StreamEvent`]: events surfaced while a reply streams in

pub mod sse;
pub mod stream;
pub mod wire;
