//! Session route handlers.

use super::ServerState;
use super::error::{ApiError, SESSION_NOT_FOUND, SESSION_OR_DATA_INVALID};
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use chatnest_domain::{Session, SessionSummary};
use serde_json::{Value, json};

/// Plain-text banner for `GET /`.
pub const HEALTH_BANNER: &str = "小星大姐姐多会话后端已就绪! 🚀";

pub async fn health() -> &'static str {
    HEALTH_BANNER
}

pub async fn list_sessions(
    State(state): State<ServerState>,
) -> Result<Json<Vec<SessionSummary>>, ApiError> {
    state
        .sessions
        .list()
        .await
        .map(Json)
        .map_err(|e| ApiError::from_domain(e, SESSION_NOT_FOUND))
}

pub async fn create_session(State(state): State<ServerState>) -> Result<Json<Session>, ApiError> {
    state
        .sessions
        .create()
        .await
        .map(Json)
        .map_err(|e| ApiError::from_domain(e, SESSION_NOT_FOUND))
}

pub async fn get_session(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    state
        .sessions
        .get(&id)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_domain(e, SESSION_NOT_FOUND))
}

/// `POST /api/sessions/{id}/messages` with `{"messages": [...]}`.
///
/// The body is parsed by hand so that a body that is not JSON at all gets
/// the same 404 as a wrong `messages` field.
pub async fn replace_messages(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let messages = payload.get("messages").cloned().unwrap_or(Value::Null);

    state
        .sessions
        .replace_messages_json(&id, &messages)
        .await
        .map_err(|e| ApiError::from_domain(e, SESSION_OR_DATA_INVALID))?;
    Ok(Json(json!({ "success": true })))
}

pub async fn delete_session(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .sessions
        .delete(&id)
        .await
        .map_err(|e| ApiError::from_domain(e, SESSION_NOT_FOUND))?;
    Ok(Json(json!({ "success": true })))
}
