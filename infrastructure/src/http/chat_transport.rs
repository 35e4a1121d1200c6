//! reqwest-based chat-completion transport.

use async_trait::async_trait;
use chatnest_application::ports::chat_gateway::{
    ChatResponse, ChatTransport, DispatchTarget, GatewayError,
};
use chatnest_domain::util::preview;
use chatnest_domain::{ChatCompletion, ChatRequest};
use futures::StreamExt;
use std::time::Duration;
use tracing::{debug, warn};

/// Posts chat requests over HTTPS.
///
/// Only connecting is bounded by a timeout: a streamed reply may take as
/// long as the backend needs.
pub struct ReqwestChatTransport {
    client: reqwest::Client,
}

impl ReqwestChatTransport {
    pub fn new(connect_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ChatTransport for ReqwestChatTransport {
    async fn send(
        &self,
        target: &DispatchTarget,
        request: &ChatRequest,
    ) -> Result<ChatResponse, GatewayError> {
        let mut builder = self.client.post(&target.url).json(request);
        for (name, value) in &target.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("{} answered {}: {}", target.url, status, preview(&body, 200));
            return Err(GatewayError::Status {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("Unknown")
                    .to_string(),
            });
        }

        if target.streaming {
            debug!("Streaming reply from {}", target.url);
            let bytes = response
                .bytes_stream()
                .map(|chunk| {
                    chunk
                        .map(|b| b.to_vec())
                        .map_err(|e| GatewayError::ConnectionError(e.to_string()))
                })
                .boxed();
            return Ok(ChatResponse::Stream(bytes));
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
        completion
            .content()
            .map(|text| ChatResponse::Complete(text.to_string()))
            .ok_or_else(|| GatewayError::MalformedResponse("reply has no message content".to_string()))
    }
}
