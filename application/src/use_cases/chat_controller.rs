//! Chat Controller use case.
//!
//! Owns the client-side conversation state: the current session, its
//! messages, the model selection and the API keys. Every mutation of the
//! message list is reported to the [`SyncScheduler`], which persists the
//! sequence once edits pause.
//!
//! The controller is single-owner (`&mut self` everywhere). Rendering goes
//! through the injected [`ChatObserver`].

use crate::config::ChatBehavior;
use crate::ports::chat_gateway::{ChatResponse, ChatTransport};
use crate::ports::chat_observer::{ChatObserver, NoChatObserver};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::local_mirror::{LocalMirror, MirrorError, NoLocalMirror};
use crate::ports::session_api::{SessionApi, SessionApiError};
use crate::use_cases::assembler::{StreamAssembler, StreamEnd};
use crate::use_cases::dispatcher::{DispatchError, ModelDispatcher};
use crate::use_cases::sync_scheduler::SyncScheduler;
use chatnest_domain::session::entities::sort_newest_first;
use chatnest_domain::{DomainError, Message, ModelCatalog, SessionSummary, StreamEvent};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Errors surfaced by controller operations.
///
/// Upstream failures while sending are not errors here: they turn into the
/// fallback reply.
#[derive(Error, Debug)]
pub enum ChatControllerError {
    #[error(transparent)]
    Session(#[from] SessionApiError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Mirror(#[from] MirrorError),
}

/// Client-side conversation controller.
pub struct ChatController {
    api: Arc<dyn SessionApi>,
    transport: Arc<dyn ChatTransport>,
    dispatcher: ModelDispatcher,
    behavior: ChatBehavior,
    scheduler: SyncScheduler,
    sessions: Arc<RwLock<Vec<SessionSummary>>>,
    observer: Arc<dyn ChatObserver>,
    logger: Arc<dyn ConversationLogger>,
    mirror: Arc<dyn LocalMirror>,
    messages: Vec<Message>,
    current_session_id: Option<String>,
    is_loading: bool,
    selected_model: String,
    api_keys: HashMap<String, String>,
}

impl ChatController {
    pub fn new(
        api: Arc<dyn SessionApi>,
        transport: Arc<dyn ChatTransport>,
        dispatcher: ModelDispatcher,
        behavior: ChatBehavior,
    ) -> Self {
        let sessions = Arc::new(RwLock::new(Vec::new()));
        let observer: Arc<dyn ChatObserver> = Arc::new(NoChatObserver);
        let logger: Arc<dyn ConversationLogger> = Arc::new(NoConversationLogger);
        let mirror: Arc<dyn LocalMirror> = Arc::new(NoLocalMirror);
        let scheduler = SyncScheduler::new(
            Arc::clone(&api),
            Arc::clone(&sessions),
            Arc::clone(&observer),
            Arc::clone(&logger),
            behavior.sync_debounce,
        );
        let api_keys = resolve_api_keys(dispatcher.catalog(), mirror.as_ref());
        let selected_model = behavior.default_model.clone();

        Self {
            api,
            transport,
            dispatcher,
            behavior,
            scheduler,
            sessions,
            observer,
            logger,
            mirror,
            messages: Vec::new(),
            current_session_id: None,
            is_loading: false,
            selected_model,
            api_keys,
        }
    }

    /// Set the observer that renders conversation updates.
    pub fn with_observer(mut self, observer: Arc<dyn ChatObserver>) -> Self {
        self.observer = observer;
        self.rebuild_scheduler();
        self
    }

    /// Set the conversation transcript logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self.rebuild_scheduler();
        self
    }

    /// Set the client-local mirror. Stored API keys are loaded from it.
    pub fn with_local_mirror(mut self, mirror: Arc<dyn LocalMirror>) -> Self {
        self.api_keys = resolve_api_keys(self.dispatcher.catalog(), mirror.as_ref());
        self.mirror = mirror;
        self
    }

    fn rebuild_scheduler(&mut self) {
        self.scheduler = SyncScheduler::new(
            Arc::clone(&self.api),
            Arc::clone(&self.sessions),
            Arc::clone(&self.observer),
            Arc::clone(&self.logger),
            self.behavior.sync_debounce,
        );
    }

    // ==================== Accessors ====================

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn current_session_id(&self) -> Option<&str> {
        self.current_session_id.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn selected_model(&self) -> &str {
        &self.selected_model
    }

    pub fn catalog(&self) -> &ModelCatalog {
        self.dispatcher.catalog()
    }

    pub fn has_api_key(&self, model_id: &str) -> bool {
        self.api_keys
            .get(model_id)
            .is_some_and(|k| !k.trim().is_empty())
    }

    /// Snapshot of the session summaries, newest first.
    pub async fn sessions(&self) -> Vec<SessionSummary> {
        self.sessions.read().await.clone()
    }

    // ==================== Sessions ====================

    /// Load the session list and make sure a session is active.
    ///
    /// With no sessions on the server a new chat is created; with no
    /// current session the newest one is opened. When the server cannot be
    /// reached the last mirrored history is shown and the error returned.
    pub async fn load_sessions(&mut self) -> Result<(), ChatControllerError> {
        let summaries = match self.fetch_summaries().await {
            Ok(summaries) => summaries,
            Err(e) => {
                warn!("Failed to load sessions: {}", e);
                if let Some(history) = self.mirror.load_history() {
                    info!("Showing {} mirrored messages while offline", history.len());
                    self.messages = history;
                    self.observer.on_conversation_reset();
                }
                return Err(e.into());
            }
        };

        if summaries.is_empty() {
            self.create_new_chat().await
        } else if self.current_session_id.is_none() {
            let newest = summaries[0].id.clone();
            self.switch_session(&newest).await
        } else {
            Ok(())
        }
    }

    /// Re-read the summary list from the server.
    pub async fn refresh_sessions(&mut self) -> Result<(), ChatControllerError> {
        self.fetch_summaries().await?;
        Ok(())
    }

    async fn fetch_summaries(&self) -> Result<Vec<SessionSummary>, SessionApiError> {
        let mut summaries = self.api.list().await?;
        sort_newest_first(&mut summaries);
        self.observer.on_sessions_refreshed(&summaries);
        *self.sessions.write().await = summaries.clone();
        Ok(summaries)
    }

    /// Open another session.
    ///
    /// Any pending sync of the previous session is written first.
    pub async fn switch_session(&mut self, id: &str) -> Result<(), ChatControllerError> {
        self.scheduler.flush().await;
        let session = self.api.get(id).await?;
        debug!("Switched to session {} ({} messages)", session.id, session.messages.len());

        self.current_session_id = Some(session.id);
        self.messages = session.messages;
        self.mirror_history();
        self.observer.on_conversation_reset();
        self.observer.scroll_to_bottom();
        Ok(())
    }

    /// Create a session on the server and open it.
    pub async fn create_new_chat(&mut self) -> Result<(), ChatControllerError> {
        self.scheduler.flush().await;
        let session = self.api.create().await?;
        info!("Started new chat {}", session.id);

        self.current_session_id = Some(session.id);
        self.messages = session.messages;
        self.mirror_history();
        self.observer.on_conversation_reset();
        self.refresh_sessions().await
    }

    /// Delete a session. Deleting the current one drops its unsynced edits
    /// and opens whatever session is left (or a new one).
    pub async fn delete_session(&mut self, id: &str) -> Result<(), ChatControllerError> {
        self.api.delete(id).await?;
        info!("Deleted session {}", id);

        if self.current_session_id.as_deref() == Some(id) {
            self.scheduler.cancel();
            self.current_session_id = None;
            self.messages.clear();
            self.observer.on_conversation_reset();
        }
        self.load_sessions().await
    }

    /// Delete the current session.
    pub async fn clear_chat(&mut self) -> Result<(), ChatControllerError> {
        match self.current_session_id.clone() {
            Some(id) => self.delete_session(&id).await,
            None => Ok(()),
        }
    }

    // ==================== Models & keys ====================

    pub fn set_model(&mut self, model_id: &str) -> Result<(), ChatControllerError> {
        let config = self.dispatcher.model(model_id)?;
        self.selected_model = config.id.clone();
        Ok(())
    }

    /// Store the API key for `model_id` and persist all keys.
    pub fn save_api_key(&mut self, model_id: &str, key: &str) -> Result<(), ChatControllerError> {
        self.dispatcher.model(model_id)?;
        self.api_keys
            .insert(model_id.to_string(), key.trim().to_string());
        self.mirror.save_api_keys(&self.api_keys)?;
        Ok(())
    }

    // ==================== Sending ====================

    /// Send a user message and stream the reply into the conversation.
    ///
    /// Returns the terminal event of the reply, or `None` when the input is
    /// blank or a reply is already in progress.
    pub async fn send_message(&mut self, content: &str) -> Option<StreamEvent> {
        let content = content.trim();
        if content.is_empty() || self.is_loading {
            return None;
        }
        self.is_loading = true;

        let session_id = self.current_session_id.clone().unwrap_or_default();
        let model = self.selected_model.clone();
        self.logger
            .log(ConversationEvent::user_message(&session_id, &model, content));

        self.messages.push(Message::user(content));
        self.notify_mutation();
        self.observer.scroll_to_bottom();

        let event = match self.request_reply().await {
            Ok(response) => self.receive_reply(response, &session_id, &model).await,
            Err(e) => {
                warn!("Request to {} failed: {}", model, e);
                self.logger.log(ConversationEvent::upstream_failure(
                    &session_id,
                    &model,
                    &e.to_string(),
                ));
                let fallback = self.behavior.fallback_reply.clone();
                self.messages.push(Message::assistant(fallback.clone()));
                self.notify_mutation();
                StreamEvent::Failed(fallback)
            }
        };

        self.observer.on_stream_event(&event);
        self.observer.scroll_to_bottom();
        self.mirror_history();
        self.is_loading = false;
        Some(event)
    }

    async fn request_reply(&self) -> Result<ChatResponse, DispatchError> {
        let dispatch =
            self.dispatcher
                .prepare(&self.selected_model, &self.messages, &self.api_keys)?;
        debug!(
            "Sending {} messages to {} ({})",
            dispatch.request.messages.len(),
            dispatch.model_id,
            dispatch.target.url
        );
        Ok(self.transport.send(&dispatch.target, &dispatch.request).await?)
    }

    /// Append the assistant reply as it arrives.
    async fn receive_reply(
        &mut self,
        response: ChatResponse,
        session_id: &str,
        model: &str,
    ) -> StreamEvent {
        self.messages.push(Message::assistant_placeholder());
        let index = self.messages.len() - 1;

        let streamed = matches!(response, ChatResponse::Stream(_));
        match response {
            ChatResponse::Stream(bytes) => {
                let mut assembler = StreamAssembler::new(bytes);
                while let Some(delta) = assembler.next_delta().await {
                    self.apply_delta(index, delta);
                }

                if let Some(report) = assembler.report() {
                    debug!(
                        "Stream ended ({:?}): {} deltas, {} skipped",
                        report.end, report.deltas, report.skipped
                    );
                    if let StreamEnd::Interrupted(e) = report.end {
                        self.logger.log(ConversationEvent::upstream_failure(
                            session_id,
                            model,
                            &e.to_string(),
                        ));
                        if report.deltas == 0 {
                            return self.replace_with_fallback(index);
                        }
                    }
                }
            }
            ChatResponse::Complete(text) => match self.behavior.typewriter_delay {
                Some(delay) => {
                    for ch in text.chars() {
                        self.apply_delta(index, ch.to_string());
                        tokio::time::sleep(delay).await;
                    }
                }
                None => self.apply_delta(index, text),
            },
        }

        let reply = self.messages[index].content.clone();
        self.logger.log(ConversationEvent::assistant_reply(
            session_id, model, &reply, streamed,
        ));
        StreamEvent::Completed(reply)
    }

    fn apply_delta(&mut self, index: usize, delta: String) {
        self.messages[index].append(&delta);
        self.notify_mutation();
        self.observer.on_stream_event(&StreamEvent::Delta(delta));
        self.observer.scroll_to_bottom();
    }

    fn replace_with_fallback(&mut self, index: usize) -> StreamEvent {
        let fallback = self.behavior.fallback_reply.clone();
        self.messages[index].content = fallback.clone();
        self.notify_mutation();
        StreamEvent::Failed(fallback)
    }

    fn notify_mutation(&mut self) {
        self.scheduler
            .notify(self.current_session_id.as_deref(), &self.messages);
    }

    fn mirror_history(&self) {
        if let Err(e) = self.mirror.save_history(&self.messages) {
            warn!("Failed to mirror chat history: {}", e);
        }
    }

    /// Write any pending sync before the controller goes away.
    pub async fn shutdown(&mut self) {
        self.scheduler.flush().await;
    }
}

/// Keys from the mirror, falling back to each model's env var.
fn resolve_api_keys(catalog: &ModelCatalog, mirror: &dyn LocalMirror) -> HashMap<String, String> {
    let stored = mirror.load_api_keys();
    catalog
        .iter()
        .filter_map(|config| {
            let key = stored
                .get(&config.id)
                .filter(|k| !k.trim().is_empty())
                .cloned()
                .or_else(|| {
                    config
                        .api_key_env
                        .as_deref()
                        .and_then(|var| std::env::var(var).ok())
                        .filter(|k| !k.trim().is_empty())
                })?;
            Some((config.id.clone(), key))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::chat_gateway::{DispatchTarget, GatewayError};
    use crate::ports::session_api::LocalSessionApi;
    use crate::use_cases::assembler::tests::{byte_stream, frame};
    use crate::use_cases::session_service::tests::service;
    use async_trait::async_trait;
    use chatnest_domain::session::entities::GREETING;
    use chatnest_domain::{ChatRequest, ModelConfig, Role};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    enum Scripted {
        Stream(Vec<Result<Vec<u8>, GatewayError>>),
        Complete(String),
        Fail(GatewayError),
    }

    #[derive(Default)]
    struct ScriptedTransport {
        replies: Mutex<VecDeque<Scripted>>,
        requests: Mutex<Vec<(DispatchTarget, ChatRequest)>>,
    }

    impl ScriptedTransport {
        fn push(&self, reply: Scripted) {
            self.replies.lock().unwrap().push_back(reply);
        }

        fn sent(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn send(
            &self,
            target: &DispatchTarget,
            request: &ChatRequest,
        ) -> Result<ChatResponse, GatewayError> {
            self.requests
                .lock()
                .unwrap()
                .push((target.clone(), request.clone()));
            match self.replies.lock().unwrap().pop_front() {
                Some(Scripted::Stream(chunks)) => Ok(ChatResponse::Stream(byte_stream(chunks))),
                Some(Scripted::Complete(text)) => Ok(ChatResponse::Complete(text)),
                Some(Scripted::Fail(e)) => Err(e),
                None => Err(GatewayError::TransportClosed),
            }
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<StreamEvent>>,
        scrolls: AtomicUsize,
    }

    impl ChatObserver for RecordingObserver {
        fn on_stream_event(&self, event: &StreamEvent) {
            self.events.lock().unwrap().push(event.clone());
        }

        fn scroll_to_bottom(&self) {
            self.scrolls.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn catalog() -> ModelCatalog {
        let mut deepseek = ModelConfig::deepseek_chat();
        deepseek.api_key_env = None;
        let mut plain = ModelConfig::deepseek_chat();
        plain.id = "plain".to_string();
        plain.streaming = false;
        plain.api_key_env = None;
        ModelCatalog::empty().with_model(deepseek).with_model(plain)
    }

    struct Fixture {
        controller: ChatController,
        transport: Arc<ScriptedTransport>,
        observer: Arc<RecordingObserver>,
        api: Arc<LocalSessionApi>,
    }

    fn fixture(behavior: ChatBehavior) -> Fixture {
        let api = Arc::new(LocalSessionApi::new(service()));
        let transport = Arc::new(ScriptedTransport::default());
        let observer = Arc::new(RecordingObserver::default());
        let dispatcher = ModelDispatcher::new(catalog(), "sys", "http://localhost:3000");
        let mut controller = ChatController::new(
            api.clone(),
            transport.clone(),
            dispatcher,
            behavior,
        )
        .with_observer(observer.clone());
        controller.save_api_key("deepseek-chat", "sk-test").unwrap();
        controller.save_api_key("plain", "sk-plain").unwrap();
        Fixture {
            controller,
            transport,
            observer,
            api,
        }
    }

    fn done() -> Result<Vec<u8>, GatewayError> {
        Ok(b"data: [DONE]\n".to_vec())
    }

    #[tokio::test]
    async fn load_sessions_creates_first_chat() {
        let mut fx = fixture(ChatBehavior::default());
        fx.controller.load_sessions().await.unwrap();

        assert!(fx.controller.current_session_id().is_some());
        assert_eq!(fx.controller.messages().len(), 1);
        assert_eq!(fx.controller.messages()[0].content, GREETING);
        assert_eq!(fx.controller.sessions().await.len(), 1);
    }

    #[tokio::test]
    async fn load_sessions_opens_newest_when_none_current() {
        let fx = fixture(ChatBehavior::default());
        let older = fx.api.create().await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let newer = fx.api.create().await.unwrap();
        fx.api
            .replace_messages(&newer.id, &[Message::user("newest")])
            .await
            .unwrap();

        let mut controller = fx.controller;
        controller.load_sessions().await.unwrap();
        assert_eq!(controller.current_session_id(), Some(newer.id.as_str()));
        assert_ne!(controller.current_session_id(), Some(older.id.as_str()));
    }

    #[tokio::test]
    async fn streamed_reply_is_appended_and_synced() {
        let mut fx = fixture(ChatBehavior::default());
        fx.controller.load_sessions().await.unwrap();
        fx.transport.push(Scripted::Stream(vec![
            Ok(frame("你好").into_bytes()),
            Ok(frame("呀").into_bytes()),
            done(),
        ]));

        let event = fx.controller.send_message("  讲个恐龙的故事  ").await;
        assert_eq!(event, Some(StreamEvent::Completed("你好呀".to_string())));

        let messages = fx.controller.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "讲个恐龙的故事");
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[2].content, "你好呀");

        let events = fx.observer.events.lock().unwrap().clone();
        assert_eq!(
            events,
            [
                StreamEvent::Delta("你好".to_string()),
                StreamEvent::Delta("呀".to_string()),
                StreamEvent::Completed("你好呀".to_string()),
            ]
        );
        assert!(fx.observer.scrolls.load(Ordering::SeqCst) >= 2);

        fx.controller.shutdown().await;
        let id = fx.controller.current_session_id().unwrap().to_string();
        let stored = fx.api.get(&id).await.unwrap();
        assert_eq!(stored.messages, fx.controller.messages());
        assert_eq!(stored.title, "讲个恐龙的故事");
        assert!(!fx.controller.is_loading());
    }

    #[tokio::test]
    async fn request_payload_carries_history_without_ids() {
        let mut fx = fixture(ChatBehavior::default());
        fx.controller.load_sessions().await.unwrap();
        fx.transport.push(Scripted::Stream(vec![done()]));
        fx.controller.send_message("hi").await;

        let requests = fx.transport.requests.lock().unwrap();
        let (target, request) = &requests[0];
        assert_eq!(
            target.headers,
            vec![("Authorization".to_string(), "Bearer sk-test".to_string())]
        );
        let roles: Vec<_> = request.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, ["system", "assistant", "user"]);
    }

    #[tokio::test]
    async fn upstream_failure_pushes_fallback_without_placeholder() {
        let mut fx = fixture(ChatBehavior::default());
        fx.controller.load_sessions().await.unwrap();
        fx.transport.push(Scripted::Fail(GatewayError::Status {
            status: 500,
            message: "boom".to_string(),
        }));

        let event = fx.controller.send_message("hello").await;
        let fallback = ChatBehavior::default().fallback_reply;
        assert_eq!(event, Some(StreamEvent::Failed(fallback.clone())));

        let messages = fx.controller.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].content, fallback);
        assert!(messages.iter().all(|m| !m.content.is_empty()));
    }

    #[tokio::test]
    async fn missing_key_never_reaches_transport() {
        let mut fx = fixture(ChatBehavior::default());
        fx.controller.load_sessions().await.unwrap();
        fx.controller.save_api_key("deepseek-chat", "   ").unwrap();

        let event = fx.controller.send_message("hello").await;
        assert!(matches!(event, Some(StreamEvent::Failed(_))));
        assert_eq!(fx.transport.sent(), 0);
        assert!(!fx.controller.has_api_key("deepseek-chat"));
    }

    #[tokio::test]
    async fn interrupted_stream_keeps_partial_reply() {
        let mut fx = fixture(ChatBehavior::default());
        fx.controller.load_sessions().await.unwrap();
        fx.transport.push(Scripted::Stream(vec![
            Ok(frame("从前").into_bytes()),
            Err(GatewayError::TransportClosed),
        ]));

        let event = fx.controller.send_message("故事").await;
        assert_eq!(event, Some(StreamEvent::Completed("从前".to_string())));
        assert_eq!(fx.controller.messages()[2].content, "从前");
    }

    #[tokio::test]
    async fn interrupted_before_any_text_falls_back() {
        let mut fx = fixture(ChatBehavior::default());
        fx.controller.load_sessions().await.unwrap();
        fx.transport
            .push(Scripted::Stream(vec![Err(GatewayError::TransportClosed)]));

        let event = fx.controller.send_message("故事").await;
        assert!(matches!(event, Some(StreamEvent::Failed(_))));
        assert_eq!(fx.controller.messages().len(), 3);
        assert_eq!(
            fx.controller.messages()[2].content,
            ChatBehavior::default().fallback_reply
        );
    }

    #[tokio::test(start_paused = true)]
    async fn non_streaming_reply_uses_typewriter_when_enabled() {
        let mut fx = fixture(ChatBehavior::default().with_typewriter_delay_ms(30));
        fx.controller.load_sessions().await.unwrap();
        fx.controller.set_model("plain").unwrap();
        fx.transport.push(Scripted::Complete("小星".to_string()));

        let event = fx.controller.send_message("你是谁").await;
        assert_eq!(event, Some(StreamEvent::Completed("小星".to_string())));

        let deltas: Vec<_> = fx
            .observer
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| !e.is_terminal())
            .map(|e| e.text().to_string())
            .collect();
        assert_eq!(deltas, ["小", "星"]);
        assert!(!fx.transport.requests.lock().unwrap()[0].1.stream);
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let mut fx = fixture(ChatBehavior::default());
        fx.controller.load_sessions().await.unwrap();
        assert_eq!(fx.controller.send_message("   ").await, None);
        assert_eq!(fx.controller.messages().len(), 1);
    }

    #[tokio::test]
    async fn switch_session_flushes_pending_edits_first() {
        let mut fx = fixture(ChatBehavior::default());
        fx.controller.load_sessions().await.unwrap();
        let first = fx.controller.current_session_id().unwrap().to_string();
        fx.transport.push(Scripted::Stream(vec![Ok(frame("ok").into_bytes()), done()]));
        fx.controller.send_message("第一个会话").await;

        let second = fx.api.create().await.unwrap();
        fx.controller.switch_session(&second.id).await.unwrap();

        assert_eq!(fx.api.get(&first).await.unwrap().messages.len(), 3);
        assert_eq!(fx.controller.messages().len(), 1);
        assert_eq!(fx.controller.current_session_id(), Some(second.id.as_str()));
    }

    #[tokio::test]
    async fn deleting_current_session_opens_remaining_one() {
        let mut fx = fixture(ChatBehavior::default());
        fx.controller.load_sessions().await.unwrap();
        let first = fx.controller.current_session_id().unwrap().to_string();
        fx.controller.create_new_chat().await.unwrap();
        let second = fx.controller.current_session_id().unwrap().to_string();
        assert_ne!(first, second);

        fx.controller.clear_chat().await.unwrap();
        assert_eq!(fx.controller.current_session_id(), Some(first.as_str()));
        assert_eq!(fx.controller.sessions().await.len(), 1);
    }

    #[tokio::test]
    async fn deleting_last_session_creates_a_new_one() {
        let mut fx = fixture(ChatBehavior::default());
        fx.controller.load_sessions().await.unwrap();
        let only = fx.controller.current_session_id().unwrap().to_string();

        fx.controller.delete_session(&only).await.unwrap();
        let current = fx.controller.current_session_id().unwrap();
        assert_ne!(current, only);
        assert_eq!(fx.controller.messages().len(), 1);
    }

    #[tokio::test]
    async fn unknown_model_is_rejected() {
        let mut fx = fixture(ChatBehavior::default());
        let err = fx.controller.set_model("gpt-nope").unwrap_err();
        assert!(matches!(
            err,
            ChatControllerError::Domain(DomainError::UnknownModel(_))
        ));
        assert_eq!(fx.controller.selected_model(), "deepseek-chat");
        assert!(fx.controller.save_api_key("gpt-nope", "k").is_err());
    }
}
