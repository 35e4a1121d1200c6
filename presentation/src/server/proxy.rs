//! Same-origin proxy for backends whose auth header cannot be sent
//! cross-origin.
//!
//! Forwards the request body and the credential header to the configured
//! upstream and streams the upstream response back unchanged.

use super::ServerState;
use super::error::ApiError;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chatnest_domain::ProxyRoute;
use tracing::{debug, warn};

/// Where the proxied backend is served and where it forwards to.
#[derive(Debug, Clone)]
pub struct ChatProxy {
    pub route: ProxyRoute,
    /// Upstream chat-completion endpoint.
    pub upstream: String,
}

impl ChatProxy {
    pub fn new(route: ProxyRoute, upstream: impl Into<String>) -> Self {
        Self {
            route,
            upstream: upstream.into(),
        }
    }
}

pub async fn forward_chat_completion(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    // Only registered when a proxy is configured
    let Some(proxy) = state.proxy.as_deref() else {
        return Err(ApiError::bad_gateway("no proxied backend configured"));
    };

    let credential = proxy.route.credential_header.as_str();
    let mut request = state
        .http
        .post(proxy.upstream.as_str())
        .header(header::CONTENT_TYPE.as_str(), "application/json")
        .body(body.to_vec());
    if let Some(key) = headers.get(credential).and_then(|v| v.to_str().ok()) {
        request = request.header(credential, key);
    }

    let upstream = request.send().await.map_err(|e| {
        warn!("Proxy upstream {} unreachable: {}", proxy.upstream, e);
        ApiError::bad_gateway(format!("upstream unreachable: {e}"))
    })?;

    let status = StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    debug!("Proxy upstream answered {}", status);
    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE.as_str())
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/json")
        .to_string();

    Ok((
        status,
        [(header::CONTENT_TYPE, content_type)],
        Body::from_stream(upstream.bytes_stream()),
    )
        .into_response())
}
