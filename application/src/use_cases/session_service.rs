//! Session Service use case.
//!
//! CRUD over a [`SessionStore`] plus auto-titling. This is what the HTTP
//! handlers call; it knows nothing about HTTP.

use chatnest_domain::session::entities::{now_millis, parse_message_list};
use chatnest_domain::{DomainError, Message, Session, SessionStore, SessionSummary};
use chrono::Local;
use std::sync::Arc;
use tracing::{debug, info};

/// Session CRUD over an injected store.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn SessionStore>,
}

impl SessionService {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Summaries of all sessions. Message sequences are never included.
    pub async fn list(&self) -> Result<Vec<SessionSummary>, DomainError> {
        let sessions = self.store.list().await?;
        Ok(sessions.iter().map(Session::summary).collect())
    }

    /// Create a session seeded with the greeting.
    pub async fn create(&self) -> Result<Session, DomainError> {
        let session = Session::new(Local::now());
        self.store.put(session.clone()).await?;
        info!("Created session {}", session.id);
        Ok(session)
    }

    pub async fn get(&self, id: &str) -> Result<Session, DomainError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(id.to_string()))
    }

    /// Replace a session's messages wholesale.
    pub async fn replace_messages(&self, id: &str, messages: Vec<Message>) -> Result<(), DomainError> {
        let mut session = self.get(id).await?;
        session.replace_messages(messages, now_millis());
        debug!(
            "Replaced messages of {} ({} messages, title {:?})",
            id,
            session.messages.len(),
            session.title
        );
        self.store.put(session).await
    }

    /// Replace messages from an untyped payload.
    ///
    /// A missing session is reported before the payload is looked at.
    pub async fn replace_messages_json(
        &self,
        id: &str,
        messages: &serde_json::Value,
    ) -> Result<(), DomainError> {
        // Existence first, so a bad payload for a missing id is NotFound
        self.get(id).await?;
        let messages = parse_message_list(messages)?;
        self.replace_messages(id, messages).await
    }

    /// Delete a session. Deleting a missing id is NotFound every time.
    pub async fn delete(&self, id: &str) -> Result<(), DomainError> {
        if self.store.delete(id).await? {
            info!("Deleted session {}", id);
            Ok(())
        } else {
            Err(DomainError::NotFound(id.to_string()))
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use chatnest_domain::Role;
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    /// Minimal map-backed store for use-case tests.
    #[derive(Default)]
    pub(crate) struct MapStore {
        sessions: RwLock<HashMap<String, Session>>,
    }

    #[async_trait]
    impl SessionStore for MapStore {
        async fn get(&self, id: &str) -> Result<Option<Session>, DomainError> {
            Ok(self.sessions.read().await.get(id).cloned())
        }

        async fn list(&self) -> Result<Vec<Session>, DomainError> {
            Ok(self.sessions.read().await.values().cloned().collect())
        }

        async fn put(&self, session: Session) -> Result<(), DomainError> {
            self.sessions.write().await.insert(session.id.clone(), session);
            Ok(())
        }

        async fn delete(&self, id: &str) -> Result<bool, DomainError> {
            Ok(self.sessions.write().await.remove(id).is_some())
        }
    }

    pub(crate) fn service() -> SessionService {
        SessionService::new(Arc::new(MapStore::default()))
    }

    #[tokio::test]
    async fn create_yields_single_assistant_message() {
        let service = service();
        let session = service.create().await.unwrap();
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].role, Role::Assistant);
        assert!(session.has_default_title());
    }

    #[tokio::test]
    async fn replace_then_get_returns_exact_sequence() {
        let service = service();
        let session = service.create().await.unwrap();
        let messages = vec![
            Message::user("第一句"),
            Message::assistant("回答"),
            Message::user("第二句"),
        ];

        service
            .replace_messages(&session.id, messages.clone())
            .await
            .unwrap();
        let stored = service.get(&session.id).await.unwrap();
        assert_eq!(stored.messages, messages);

        // Replace is total: a shorter sequence drops the rest
        service
            .replace_messages(&session.id, vec![messages[0].clone()])
            .await
            .unwrap();
        let stored = service.get(&session.id).await.unwrap();
        assert_eq!(stored.messages, vec![messages[0].clone()]);
    }

    #[tokio::test]
    async fn replace_derives_title_with_budget() {
        let service = service();
        let at_budget = service.create().await.unwrap();
        let over_budget = service.create().await.unwrap();

        service
            .replace_messages(&at_budget.id, vec![Message::user("你好呀今天天气真好！")])
            .await
            .unwrap();
        service
            .replace_messages(&over_budget.id, vec![Message::user("你好呀今天天气真好！！")])
            .await
            .unwrap();

        assert_eq!(service.get(&at_budget.id).await.unwrap().title, "你好呀今天天气真好！");
        assert_eq!(
            service.get(&over_budget.id).await.unwrap().title,
            "你好呀今天天气真好！..."
        );
    }

    #[tokio::test]
    async fn replace_bumps_updated_at() {
        let service = service();
        let session = service.create().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        service.replace_messages(&session.id, vec![]).await.unwrap();
        let stored = service.get(&session.id).await.unwrap();
        assert!(stored.updated_at > session.updated_at);
    }

    #[tokio::test]
    async fn replace_json_validates_payload() {
        let service = service();
        let session = service.create().await.unwrap();

        let err = service
            .replace_messages_json(&session.id, &serde_json::json!("not a list"))
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());

        let err = service
            .replace_messages_json("session_missing", &serde_json::json!([]))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        service
            .replace_messages_json(
                &session.id,
                &serde_json::json!([{"id": "m1", "role": "user", "content": "hi"}]),
            )
            .await
            .unwrap();
        assert_eq!(service.get(&session.id).await.unwrap().messages[0].id, "m1");
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let err = service().get("nope").await.unwrap_err();
        assert_eq!(err, DomainError::NotFound("nope".to_string()));
    }

    #[tokio::test]
    async fn delete_missing_is_not_found_every_time() {
        let service = service();
        assert!(service.delete("ghost").await.unwrap_err().is_not_found());
        assert!(service.delete("ghost").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn delete_then_delete_again() {
        let service = service();
        let session = service.create().await.unwrap();
        service.delete(&session.id).await.unwrap();
        assert!(service.delete(&session.id).await.unwrap_err().is_not_found());
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_returns_summaries() {
        let service = service();
        let a = service.create().await.unwrap();
        let b = service.create().await.unwrap();
        let mut ids: Vec<_> = service.list().await.unwrap().into_iter().map(|s| s.id).collect();
        ids.sort();
        let mut expected = vec![a.id, b.id];
        expected.sort();
        assert_eq!(ids, expected);
    }
}
