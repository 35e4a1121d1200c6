//! HTTP adapters built on `reqwest`.
//!
//! - [`ReqwestChatTransport`] posts chat-completion requests to model
//!   backends and hands back the raw response body.
//! - [`HttpSessionApi`] is the client side of the session server.

mod chat_transport;
mod session_client;

#[cfg(test)]
pub(crate) mod test_server;

pub use chat_transport::ReqwestChatTransport;
pub use session_client::{HttpSessionApi, SessionClientError};
