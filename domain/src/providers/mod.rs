//! Model backend catalog (provider-neutral, serde-free).
//!
//! Each backend is a [`ModelConfig`] carrying its own auth scheme, streaming
//! capability and route. Dispatch looks a backend up by identifier instead
//! of branching on model names.

use crate::core::error::DomainError;

/// How the API key is attached to an upstream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `<name>: <key>`, e.g. `api-key: <key>`
    Header(String),
}

impl AuthScheme {
    /// Header name and value for the given key.
    pub fn header(&self, api_key: &str) -> (String, String) {
        match self {
            AuthScheme::Bearer => ("Authorization".to_string(), format!("Bearer {api_key}")),
            AuthScheme::Header(name) => (name.clone(), api_key.to_string()),
        }
    }
}

/// Where the request is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Straight to the backend endpoint.
    Direct,
    /// Through the chat server's same-origin proxy at `path`, so the
    /// backend's credential shape never appears in a cross-origin request.
    Proxy { path: String },
}

/// Static configuration of one model backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    /// Identifier used for selection, e.g. `deepseek-chat`.
    pub id: String,
    /// Upstream chat-completion endpoint.
    pub endpoint: String,
    /// Model name written into the request body.
    pub wire_model: String,
    pub auth: AuthScheme,
    /// Whether replies are requested as a `data:` frame stream.
    pub streaming: bool,
    pub route: Route,
    /// Environment variable consulted when no key is stored locally.
    pub api_key_env: Option<String>,
}

/// Same-origin path the proxied backend is reached through.
pub const PROXY_CHAT_PATH: &str = "/api/v1/chat/completions";

/// What the chat server needs to serve the proxied backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRoute {
    /// Server path the client posts to.
    pub path: String,
    /// Request header carrying the credential, forwarded upstream as is.
    pub credential_header: String,
}

impl ModelConfig {
    pub fn deepseek_chat() -> Self {
        Self {
            id: "deepseek-chat".to_string(),
            endpoint: "https://api.deepseek.com/v1/chat/completions".to_string(),
            wire_model: "deepseek-chat".to_string(),
            auth: AuthScheme::Bearer,
            streaming: true,
            route: Route::Direct,
            api_key_env: Some("DEEPSEEK_API_KEY".to_string()),
        }
    }

    pub fn mimo_v2_flash() -> Self {
        Self {
            id: "mimo-v2-flash".to_string(),
            endpoint: "https://api.xiaomimimo.com/v1/chat/completions".to_string(),
            wire_model: "mimo-v2-flash".to_string(),
            auth: AuthScheme::Header("api-key".to_string()),
            streaming: true,
            route: Route::Proxy {
                path: PROXY_CHAT_PATH.to_string(),
            },
            api_key_env: Some("MIMO_API_KEY".to_string()),
        }
    }

    /// URL the client actually posts to.
    ///
    /// `server_base` is the chat server origin used for proxied routes.
    pub fn request_url(&self, server_base: &str) -> String {
        match &self.route {
            Route::Direct => self.endpoint.clone(),
            Route::Proxy { path } => format!("{}{}", server_base.trim_end_matches('/'), path),
        }
    }
}

/// Immutable set of backends keyed by identifier.
///
/// Keeps insertion order so listings are stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    models: Vec<ModelConfig>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ModelCatalog {
    /// The backends shipped with chatnest.
    pub fn builtin() -> Self {
        Self {
            models: vec![ModelConfig::deepseek_chat(), ModelConfig::mimo_v2_flash()],
        }
    }

    pub fn empty() -> Self {
        Self { models: Vec::new() }
    }

    /// Add a backend, replacing any existing one with the same id.
    pub fn with_model(mut self, config: ModelConfig) -> Self {
        match self.models.iter_mut().find(|m| m.id == config.id) {
            Some(existing) => *existing = config,
            None => self.models.push(config),
        }
        self
    }

    pub fn get(&self, id: &str) -> Result<&ModelConfig, DomainError> {
        self.models
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| DomainError::UnknownModel(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.models.iter().any(|m| m.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(|m| m.id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelConfig> {
        self.models.iter()
    }

    /// First backend whose route goes through the proxy, if any.
    pub fn proxied(&self) -> Option<&ModelConfig> {
        self.models
            .iter()
            .find(|m| matches!(m.route, Route::Proxy { .. }))
    }

    /// Server-side route of the proxied backend, if there is one.
    pub fn proxy_route(&self) -> Option<ProxyRoute> {
        let model = self.proxied()?;
        let Route::Proxy { path } = &model.route else {
            return None;
        };
        let credential_header = match &model.auth {
            AuthScheme::Bearer => "authorization".to_string(),
            AuthScheme::Header(name) => name.to_ascii_lowercase(),
        };
        Some(ProxyRoute {
            path: path.clone(),
            credential_header,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header() {
        let (name, value) = AuthScheme::Bearer.header("sk-1");
        assert_eq!(name, "Authorization");
        assert_eq!(value, "Bearer sk-1");
    }

    #[test]
    fn named_header() {
        let (name, value) = AuthScheme::Header("api-key".to_string()).header("sk-2");
        assert_eq!(name, "api-key");
        assert_eq!(value, "sk-2");
    }

    #[test]
    fn builtin_catalog_lookup() {
        let catalog = ModelCatalog::builtin();
        assert_eq!(catalog.ids().collect::<Vec<_>>(), ["deepseek-chat", "mimo-v2-flash"]);
        assert_eq!(catalog.get("deepseek-chat").unwrap().auth, AuthScheme::Bearer);
        assert!(matches!(
            catalog.get("gpt-unknown"),
            Err(DomainError::UnknownModel(id)) if id == "gpt-unknown"
        ));
    }

    #[test]
    fn request_url_per_route() {
        let direct = ModelConfig::deepseek_chat();
        assert_eq!(
            direct.request_url("http://localhost:3000"),
            "https://api.deepseek.com/v1/chat/completions"
        );

        let proxied = ModelConfig::mimo_v2_flash();
        assert_eq!(
            proxied.request_url("http://localhost:3000/"),
            "http://localhost:3000/api/v1/chat/completions"
        );
    }

    #[test]
    fn with_model_overrides_existing() {
        let mut custom = ModelConfig::deepseek_chat();
        custom.streaming = false;
        let catalog = ModelCatalog::builtin().with_model(custom);
        assert!(!catalog.get("deepseek-chat").unwrap().streaming);
        assert_eq!(catalog.ids().count(), 2);
    }

    #[test]
    fn proxied_backend() {
        assert_eq!(ModelCatalog::builtin().proxied().unwrap().id, "mimo-v2-flash");
        assert!(ModelCatalog::empty().proxied().is_none());
    }

    #[test]
    fn proxy_route_follows_the_proxied_backend() {
        assert_eq!(
            ModelCatalog::builtin().proxy_route(),
            Some(ProxyRoute {
                path: PROXY_CHAT_PATH.to_string(),
                credential_header: "api-key".to_string(),
            })
        );

        let mut bearer = ModelConfig::deepseek_chat();
        bearer.route = Route::Proxy {
            path: "/api/deepseek".to_string(),
        };
        let catalog = ModelCatalog::empty().with_model(bearer);
        let route = catalog.proxy_route().unwrap();
        assert_eq!(route.path, "/api/deepseek");
        assert_eq!(route.credential_header, "authorization");

        assert_eq!(
            ModelCatalog::empty()
                .with_model(ModelConfig::deepseek_chat())
                .proxy_route(),
            None
        );
    }
}
