//! In-memory session store.
//!
//! Contents are lost when the process exits. Writes are last-write-wins:
//! two clients replacing the same session concurrently both succeed and the
//! later write is kept.

use async_trait::async_trait;
use chatnest_domain::{DomainError, Session, SessionStore};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &str) -> Result<Option<Session>, DomainError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Session>, DomainError> {
        Ok(self.sessions.read().await.values().cloned().collect())
    }

    async fn put(&self, session: Session) -> Result<(), DomainError> {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        Ok(self.sessions.write().await.remove(id).is_some())
    }
}
