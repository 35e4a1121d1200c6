//! Sync Scheduler.
//!
//! Debounces message-sequence mutations and flushes the latest snapshot to
//! the Session API once mutations pause for the configured window.
//!
//! Trailing edge only: every mutation resets the timer, and nothing is sent
//! while mutations keep arriving faster than the window. There is no
//! maximum wait.

use crate::ports::chat_observer::ChatObserver;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::session_api::SessionApi;
use chatnest_domain::session::entities::sort_newest_first;
use chatnest_domain::{Message, SessionSummary};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Snapshot waiting to be written.
#[derive(Debug, Clone)]
struct PendingSync {
    session_id: String,
    messages: Vec<Message>,
}

/// Everything a sync run needs, shared with the timer task.
#[derive(Clone)]
struct SyncContext {
    api: Arc<dyn SessionApi>,
    sessions: Arc<RwLock<Vec<SessionSummary>>>,
    observer: Arc<dyn ChatObserver>,
    logger: Arc<dyn ConversationLogger>,
}

impl SyncContext {
    /// Write the snapshot, then refresh the summary list.
    ///
    /// Failures are logged and dropped. The caller's in-memory state stays
    /// authoritative until a later sync succeeds.
    async fn run(&self, job: PendingSync) {
        if let Err(e) = self.api.replace_messages(&job.session_id, &job.messages).await {
            warn!("Failed to sync session {}: {}", job.session_id, e);
            return;
        }
        debug!(
            "Synced session {} ({} messages)",
            job.session_id,
            job.messages.len()
        );
        self.logger
            .log(ConversationEvent::session_synced(&job.session_id, job.messages.len()));

        match self.api.list().await {
            Ok(mut summaries) => {
                sort_newest_first(&mut summaries);
                self.observer.on_sessions_refreshed(&summaries);
                *self.sessions.write().await = summaries;
            }
            Err(e) => warn!("Failed to refresh session list after sync: {}", e),
        }
    }
}

/// Cancellable debounce timer owned by the conversation controller.
pub struct SyncScheduler {
    context: SyncContext,
    window: Duration,
    pending: Arc<Mutex<Option<PendingSync>>>,
    timer: Option<CancellationToken>,
}

impl SyncScheduler {
    pub fn new(
        api: Arc<dyn SessionApi>,
        sessions: Arc<RwLock<Vec<SessionSummary>>>,
        observer: Arc<dyn ChatObserver>,
        logger: Arc<dyn ConversationLogger>,
        window: Duration,
    ) -> Self {
        Self {
            context: SyncContext {
                api,
                sessions,
                observer,
                logger,
            },
            window,
            pending: Arc::new(Mutex::new(None)),
            timer: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a mutation of `session_id`'s messages and restart the timer.
    ///
    /// Without an active session nothing is scheduled.
    pub fn notify(&mut self, session_id: Option<&str>, messages: &[Message]) {
        let Some(session_id) = session_id else {
            return;
        };

        *self.lock_pending() = Some(PendingSync {
            session_id: session_id.to_string(),
            messages: messages.to_vec(),
        });

        self.cancel_timer();
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let pending = Arc::clone(&self.pending);
        let context = self.context.clone();
        let window = self.window;

        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => return,
                _ = tokio::time::sleep(window) => {}
            }
            let job = pending.lock().unwrap_or_else(PoisonError::into_inner).take();
            if let Some(job) = job {
                context.run(job).await;
            }
        });
        self.timer = Some(token);
    }

    /// Whether a snapshot is waiting for the timer.
    pub fn has_pending(&self) -> bool {
        self.lock_pending().is_some()
    }

    /// Drop the pending snapshot without syncing. Safe to call repeatedly.
    pub fn cancel(&mut self) {
        self.cancel_timer();
        self.lock_pending().take();
    }

    /// Sync the pending snapshot now instead of waiting for the timer.
    pub async fn flush(&mut self) {
        self.cancel_timer();
        let job = self.lock_pending().take();
        if let Some(job) = job {
            self.context.run(job).await;
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(token) = self.timer.take() {
            token.cancel();
        }
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Option<PendingSync>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
