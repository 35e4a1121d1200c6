//! Session API port
//!
//! The client's view of the Session Service. Over HTTP in production; the
//! in-process adapter at the bottom of this file wraps a [`SessionService`]
//! directly.

use crate::use_cases::session_service::SessionService;
use async_trait::async_trait;
use chatnest_domain::{DomainError, Message, Session, SessionSummary};
use thiserror::Error;

/// Errors returned by Session API calls
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionApiError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Rejected by server: {0}")]
    Rejected(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl From<DomainError> for SessionApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound(id) => SessionApiError::NotFound(id),
            other => SessionApiError::Rejected(other.to_string()),
        }
    }
}

/// Client-side access to stored sessions
#[async_trait]
pub trait SessionApi: Send + Sync {
    async fn list(&self) -> Result<Vec<SessionSummary>, SessionApiError>;

    async fn create(&self) -> Result<Session, SessionApiError>;

    async fn get(&self, id: &str) -> Result<Session, SessionApiError>;

    /// Replace the whole message sequence of a session.
    async fn replace_messages(&self, id: &str, messages: &[Message])
    -> Result<(), SessionApiError>;

    async fn delete(&self, id: &str) -> Result<(), SessionApiError>;
}

/// [`SessionApi`] backed by an in-process [`SessionService`].
pub struct LocalSessionApi {
    service: SessionService,
}

impl LocalSessionApi {
    pub fn new(service: SessionService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl SessionApi for LocalSessionApi {
    async fn list(&self) -> Result<Vec<SessionSummary>, SessionApiError> {
        Ok(self.service.list().await?)
    }

    async fn create(&self) -> Result<Session, SessionApiError> {
        Ok(self.service.create().await?)
    }

    async fn get(&self, id: &str) -> Result<Session, SessionApiError> {
        Ok(self.service.get(id).await?)
    }

    async fn replace_messages(
        &self,
        id: &str,
        messages: &[Message],
    ) -> Result<(), SessionApiError> {
        Ok(self.service.replace_messages(id, messages.to_vec()).await?)
    }

    async fn delete(&self, id: &str) -> Result<(), SessionApiError> {
        Ok(self.service.delete(id).await?)
    }
}
