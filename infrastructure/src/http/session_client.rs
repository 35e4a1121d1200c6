//! HTTP client for the session server.

use async_trait::async_trait;
use chatnest_application::ports::session_api::{SessionApi, SessionApiError};
use chatnest_domain::{Message, Session, SessionSummary};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Body of an error response: `{"error": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct ReplaceMessagesBody<'a> {
    messages: &'a [Message],
}

/// Failure to set up the HTTP session client.
#[derive(Error, Debug)]
pub enum SessionClientError {
    #[error("Invalid session server URL '{0}'")]
    InvalidBaseUrl(String),

    #[error(transparent)]
    Client(#[from] reqwest::Error),
}

/// [`SessionApi`] over the `/api/sessions` routes.
pub struct HttpSessionApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpSessionApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SessionClientError> {
        let base_url = Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| SessionClientError::InvalidBaseUrl(base_url.to_string()))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// `<base>/api/sessions/<segments...>`, each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["api", "sessions"])
                .extend(segments);
        }
        url
    }

    /// Ids never contain path syntax; reject what cannot name a session.
    fn check_id(id: &str) -> Result<(), SessionApiError> {
        if id.is_empty() || id == "." || id == ".." {
            return Err(SessionApiError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        id: Option<&str>,
    ) -> Result<reqwest::Response, SessionApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| SessionApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.canonical_reason().unwrap_or("Unknown").to_string(),
        };
        debug!("Session API answered {}: {}", status, message);

        if status == reqwest::StatusCode::NOT_FOUND {
            Err(SessionApiError::NotFound(id.unwrap_or(&message).to_string()))
        } else {
            Err(SessionApiError::Rejected(format!("{}: {}", status.as_u16(), message)))
        }
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, SessionApiError> {
        response
            .json()
            .await
            .map_err(|e| SessionApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl SessionApi for HttpSessionApi {
    async fn list(&self) -> Result<Vec<SessionSummary>, SessionApiError> {
        let response = self.execute(self.client.get(self.url(&[])), None).await?;
        Self::decode(response).await
    }

    async fn create(&self) -> Result<Session, SessionApiError> {
        let response = self.execute(self.client.post(self.url(&[])), None).await?;
        Self::decode(response).await
    }

    async fn get(&self, id: &str) -> Result<Session, SessionApiError> {
        Self::check_id(id)?;
        let request = self.client.get(self.url(&[id]));
        let response = self.execute(request, Some(id)).await?;
        Self::decode(response).await
    }

    async fn replace_messages(
        &self,
        id: &str,
        messages: &[Message],
    ) -> Result<(), SessionApiError> {
        Self::check_id(id)?;
        let request = self
            .client
            .post(self.url(&[id, "messages"]))
            .json(&ReplaceMessagesBody { messages });
        self.execute(request, Some(id)).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), SessionApiError> {
        Self::check_id(id)?;
        let request = self.client.delete(self.url(&[id]));
        self.execute(request, Some(id)).await?;
        Ok(())
    }
}
