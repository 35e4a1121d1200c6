//! Session server
//!
//! Axum router exposing the Session Service over HTTP, plus the health
//! banner and the same-origin chat proxy.
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /` | [`handlers::health`] |
//! | `GET /api/sessions` | [`handlers::list_sessions`] |
//! | `POST /api/sessions` | [`handlers::create_session`] |
//! | `GET /api/sessions/:id` | [`handlers::get_session`] |
//! | `POST /api/sessions/:id/messages` | [`handlers::replace_messages`] |
//! | `DELETE /api/sessions/:id` | [`handlers::delete_session`] |
//! | `POST <proxy path>` | [`proxy::forward_chat_completion`] |
//!
//! The proxy route is only registered when a [`ChatProxy`] is configured.
//! Its path comes from the proxied model, `/api/v1/chat/completions` by
//! default.

pub mod error;
pub mod handlers;
pub mod proxy;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use chatnest_application::SessionService;
pub use proxy::ChatProxy;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Largest accepted request body.
pub const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Shared state of all handlers.
#[derive(Clone)]
pub struct ServerState {
    pub sessions: SessionService,
    pub proxy: Option<Arc<ChatProxy>>,
    pub http: reqwest::Client,
}

impl ServerState {
    pub fn new(sessions: SessionService, proxy: Option<ChatProxy>) -> Self {
        Self {
            sessions,
            proxy: proxy.map(Arc::new),
            http: reqwest::Client::new(),
        }
    }
}

pub fn router(state: ServerState) -> Router {
    let mut router = Router::new()
        .route("/", get(handlers::health))
        .route(
            "/api/sessions",
            get(handlers::list_sessions).post(handlers::create_session),
        )
        .route(
            "/api/sessions/:id",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/api/sessions/:id/messages", post(handlers::replace_messages));
    if let Some(chat) = &state.proxy {
        info!(
            "Proxying {} to {} (credential header {})",
            chat.route.path, chat.upstream, chat.route.credential_header
        );
        router = router.route(&chat.route.path, post(proxy::forward_chat_completion));
    }
    router
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: ServerState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Session server listening on http://{}", addr);
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
