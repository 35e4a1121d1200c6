//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into domain and application
//! types by [`FileConfig::to_catalog`] and [`FileConfig::to_chat_behavior`].

use chatnest_application::ChatBehavior;
use chatnest_domain::{AuthScheme, ModelCatalog, ModelConfig, Route};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("request_timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("bind address cannot be empty")]
    EmptyBindAddress,

    #[error("model {0}: url is required for models that are not built in")]
    MissingModelUrl(String),

    #[error("model {0}: auth = \"header\" needs a header_name")]
    MissingHeaderName(String),

    #[error("default_model {0} is not a configured model")]
    UnknownDefaultModel(String),

    #[error("models {0} and {1} both set proxy_path, the server proxies one model")]
    MultipleProxiedModels(String, String),

    #[error("model {0}: proxy_path {1} must be an absolute path outside / and /api/sessions")]
    InvalidProxyPath(String, String),
}

/// Paths the session routes already own.
const SESSION_ROUTES: &str = "/api/sessions";

fn is_valid_proxy_path(path: &str) -> bool {
    path.starts_with('/')
        && path != "/"
        && !path.contains(|c: char| matches!(c, ':' | '*' | '{' | '}' | '?' | '#') || c.is_whitespace())
        && path != SESSION_ROUTES
        && !path.starts_with(&format!("{SESSION_ROUTES}/"))
}

/// `[server]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    /// Address the session server listens on
    pub bind: String,
    /// Upstream the same-origin proxy route forwards to
    pub proxy_upstream: String,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            proxy_upstream: ModelConfig::mimo_v2_flash().endpoint,
        }
    }
}

/// `[client]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileClientConfig {
    /// Origin of the session server
    pub api_base_url: String,
    pub request_timeout_seconds: u64,
    pub sync_debounce_ms: u64,
    /// Per-character delay for non-streamed replies, 0 to disable
    pub typewriter_delay_ms: u64,
    /// Overrides the built-in persona prompt
    pub system_prompt: Option<String>,
    pub default_model: String,
}

impl Default for FileClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000".to_string(),
            request_timeout_seconds: 30,
            sync_debounce_ms: 1000,
            typewriter_delay_ms: 0,
            system_prompt: None,
            default_model: "deepseek-chat".to_string(),
        }
    }
}

/// Auth header scheme as written in TOML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileAuthScheme {
    Bearer,
    Header,
}

/// `[models.<id>]` section
///
/// Entries for built-in ids only need the fields they change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    pub url: Option<String>,
    /// Model name sent upstream, defaults to the id
    pub model: Option<String>,
    pub auth: Option<FileAuthScheme>,
    pub header_name: Option<String>,
    pub streaming: Option<bool>,
    /// Route through the server's proxy at this path
    pub proxy_path: Option<String>,
    pub api_key_env: Option<String>,
}

impl FileModelConfig {
    fn apply(&self, id: &str, base: Option<ModelConfig>) -> Result<ModelConfig, ConfigValidationError> {
        let mut config = match base {
            Some(base) => base,
            None => ModelConfig {
                id: id.to_string(),
                endpoint: self
                    .url
                    .clone()
                    .ok_or_else(|| ConfigValidationError::MissingModelUrl(id.to_string()))?,
                wire_model: id.to_string(),
                auth: AuthScheme::Bearer,
                streaming: true,
                route: Route::Direct,
                api_key_env: None,
            },
        };

        if let Some(url) = &self.url {
            config.endpoint = url.clone();
        }
        if let Some(model) = &self.model {
            config.wire_model = model.clone();
        }
        match (self.auth, &self.header_name) {
            (Some(FileAuthScheme::Bearer), _) => config.auth = AuthScheme::Bearer,
            (Some(FileAuthScheme::Header), Some(name)) => {
                config.auth = AuthScheme::Header(name.clone())
            }
            (Some(FileAuthScheme::Header), None) => {
                return Err(ConfigValidationError::MissingHeaderName(id.to_string()));
            }
            (None, Some(name)) if matches!(config.auth, AuthScheme::Header(_)) => {
                config.auth = AuthScheme::Header(name.clone())
            }
            (None, _) => {}
        }
        if let Some(streaming) = self.streaming {
            config.streaming = streaming;
        }
        if let Some(path) = &self.proxy_path {
            config.route = Route::Proxy { path: path.clone() };
        }
        if let Some(var) = &self.api_key_env {
            config.api_key_env = Some(var.clone());
        }
        Ok(config)
    }
}

/// `[logging]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for the daily log file and conversation transcripts.
    /// Nothing is written to disk when unset.
    pub directory: Option<String>,
}

/// Complete configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: FileServerConfig,
    pub client: FileClientConfig,
    pub models: BTreeMap<String, FileModelConfig>,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.client.request_timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.server.bind.trim().is_empty() {
            return Err(ConfigValidationError::EmptyBindAddress);
        }

        let catalog = self.to_catalog()?;
        let mut proxied = catalog.iter().filter_map(|m| match &m.route {
            Route::Proxy { path } => Some((m.id.as_str(), path.as_str())),
            Route::Direct => None,
        });
        if let Some((id, path)) = proxied.next() {
            if !is_valid_proxy_path(path) {
                return Err(ConfigValidationError::InvalidProxyPath(
                    id.to_string(),
                    path.to_string(),
                ));
            }
            if let Some((other, _)) = proxied.next() {
                return Err(ConfigValidationError::MultipleProxiedModels(
                    id.to_string(),
                    other.to_string(),
                ));
            }
        }
        if !catalog.contains(&self.client.default_model) {
            return Err(ConfigValidationError::UnknownDefaultModel(
                self.client.default_model.clone(),
            ));
        }
        Ok(())
    }

    /// Built-in backends with the `[models]` overrides applied.
    pub fn to_catalog(&self) -> Result<ModelCatalog, ConfigValidationError> {
        let mut catalog = ModelCatalog::builtin();
        for (id, entry) in &self.models {
            let base = catalog.get(id).ok().cloned();
            catalog = catalog.with_model(entry.apply(id, base)?);
        }
        Ok(catalog)
    }

    pub fn to_chat_behavior(&self) -> ChatBehavior {
        let mut behavior = ChatBehavior::default()
            .with_sync_debounce_ms(self.client.sync_debounce_ms)
            .with_typewriter_delay_ms(self.client.typewriter_delay_ms);
        if let Some(prompt) = &self.client.system_prompt {
            behavior.system_prompt = prompt.clone();
        }
        behavior.default_model = self.client.default_model.clone();
        behavior
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.client.request_timeout_seconds)
    }
}
