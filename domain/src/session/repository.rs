//! Session store trait

use super::entities::Session;
use crate::core::error::DomainError;
use async_trait::async_trait;

/// Key-value store for sessions
///
/// This is a domain-level abstraction over wherever sessions live. The
/// in-memory implementation lives in the infrastructure layer; any durable
/// key-value engine can stand in for it.
///
/// Writes are last-write-wins. There is no version token, so two clients
/// replacing the same session race and the later write survives.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a session by id
    async fn get(&self, id: &str) -> Result<Option<Session>, DomainError>;

    /// All stored sessions, in no particular order
    async fn list(&self) -> Result<Vec<Session>, DomainError>;

    /// Insert or overwrite a session under its own id
    async fn put(&self, session: Session) -> Result<(), DomainError>;

    /// Remove a session; returns whether it existed
    async fn delete(&self, id: &str) -> Result<bool, DomainError>;
}
