//! Chat transport port
//!
//! Defines how the application layer reaches a chat-completion endpoint.
//! The port deals in raw bytes: decoding the `data:` frame stream is the
//! assembler's job, not the transport's.

use async_trait::async_trait;
use chatnest_domain::ChatRequest;
use futures::stream::BoxStream;
use thiserror::Error;

/// Errors that can occur while talking to a model backend
///
/// Every variant is an upstream failure from the user's point of view: the
/// reply is replaced by the fallback message and the raw error only goes
/// to the log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Upstream returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("No API key configured for model {0}")]
    MissingCredential(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Transport closed")]
    TransportClosed,
}

/// Raw response body, one item per network read.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, GatewayError>>;

/// Where and how a request is sent, as resolved by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTarget {
    pub url: String,
    /// Auth header for the backend's scheme.
    pub headers: Vec<(String, String)>,
    pub streaming: bool,
}

/// A successful (2xx) response from the backend.
pub enum ChatResponse {
    /// Streaming body to be fed through the assembler.
    Stream(ByteStream),
    /// Full reply text of a non-streaming request.
    Complete(String),
}

impl std::fmt::Debug for ChatResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatResponse::Stream(_) => f.write_str("ChatResponse::Stream(..)"),
            ChatResponse::Complete(text) => f.debug_tuple("ChatResponse::Complete").field(text).finish(),
        }
    }
}

/// Transport for chat-completion requests
///
/// Implementations return `Err` for network failures and non-success HTTP
/// statuses, before any of the body is consumed.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(
        &self,
        target: &DispatchTarget,
        request: &ChatRequest,
    ) -> Result<ChatResponse, GatewayError>;
}
