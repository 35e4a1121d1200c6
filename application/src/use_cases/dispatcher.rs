//! Model Dispatcher.
//!
//! Turns "send this history to model X" into a concrete request: which URL,
//! which auth header, streaming or not, and the payload itself.

use crate::ports::chat_gateway::{DispatchTarget, GatewayError};
use chatnest_domain::{ChatRequest, DomainError, Message, ModelCatalog, ModelConfig};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// A fully resolved request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub model_id: String,
    pub target: DispatchTarget,
    pub request: ChatRequest,
}

/// Builds requests for the backends in a [`ModelCatalog`].
#[derive(Debug, Clone)]
pub struct ModelDispatcher {
    catalog: ModelCatalog,
    system_prompt: String,
    /// Origin of the chat server, used by proxied backends.
    server_base: String,
}

impl ModelDispatcher {
    pub fn new(
        catalog: ModelCatalog,
        system_prompt: impl Into<String>,
        server_base: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            system_prompt: system_prompt.into(),
            server_base: server_base.into(),
        }
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn model(&self, id: &str) -> Result<&ModelConfig, DomainError> {
        self.catalog.get(id)
    }

    /// Resolve the request for `model_id` over `history`.
    ///
    /// The API key is looked up in `api_keys` by model id; a missing or
    /// blank key fails here, before anything is sent.
    pub fn prepare(
        &self,
        model_id: &str,
        history: &[Message],
        api_keys: &HashMap<String, String>,
    ) -> Result<Dispatch, DispatchError> {
        let config = self.catalog.get(model_id)?;
        let api_key = api_keys
            .get(model_id)
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| GatewayError::MissingCredential(model_id.to_string()))?;

        let target = DispatchTarget {
            url: config.request_url(&self.server_base),
            headers: vec![config.auth.header(api_key)],
            streaming: config.streaming,
        };
        let request = ChatRequest::new(
            config.wire_model.clone(),
            &self.system_prompt,
            history,
            config.streaming,
        );

        Ok(Dispatch {
            model_id: config.id.clone(),
            target,
            request,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher() -> ModelDispatcher {
        ModelDispatcher::new(ModelCatalog::builtin(), "sys", "http://localhost:3000")
    }

    fn keys() -> HashMap<String, String> {
        HashMap::from([
            ("deepseek-chat".to_string(), "sk-deep".to_string()),
            ("mimo-v2-flash".to_string(), "sk-mimo".to_string()),
        ])
    }

    #[test]
    fn bearer_backend_goes_direct() {
        let history = vec![Message::user("hi")];
        let dispatch = dispatcher().prepare("deepseek-chat", &history, &keys()).unwrap();

        assert_eq!(dispatch.target.url, "https://api.deepseek.com/v1/chat/completions");
        assert_eq!(
            dispatch.target.headers,
            vec![("Authorization".to_string(), "Bearer sk-deep".to_string())]
        );
        assert!(dispatch.target.streaming);
        assert!(dispatch.request.stream);
        assert_eq!(dispatch.request.model, "deepseek-chat");
    }

    #[test]
    fn header_backend_goes_through_proxy() {
        let dispatch = dispatcher().prepare("mimo-v2-flash", &[], &keys()).unwrap();

        assert_eq!(dispatch.target.url, "http://localhost:3000/api/v1/chat/completions");
        assert_eq!(
            dispatch.target.headers,
            vec![("api-key".to_string(), "sk-mimo".to_string())]
        );
    }

    #[test]
    fn payload_is_system_prompt_then_history() {
        let history = vec![Message::assistant("greeting"), Message::user("question")];
        let dispatch = dispatcher().prepare("deepseek-chat", &history, &keys()).unwrap();

        let body = serde_json::to_string(&dispatch.request).unwrap();
        for message in &history {
            assert!(!body.contains(&message.id), "message id leaked upstream");
        }
        let roles: Vec<_> = dispatch.request.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, ["system", "assistant", "user"]);
        assert_eq!(dispatch.request.messages[0].content, "sys");
    }

    #[test]
    fn streaming_flag_follows_backend() {
        let mut config = ModelConfig::deepseek_chat();
        config.streaming = false;
        let dispatcher = ModelDispatcher::new(
            ModelCatalog::builtin().with_model(config),
            "sys",
            "http://localhost:3000",
        );
        let dispatch = dispatcher.prepare("deepseek-chat", &[], &keys()).unwrap();
        assert!(!dispatch.request.stream);
        assert!(!dispatch.target.streaming);
    }

    #[test]
    fn unknown_model_and_missing_key() {
        let err = dispatcher().prepare("nope", &[], &keys()).unwrap_err();
        assert_eq!(err, DispatchError::Domain(DomainError::UnknownModel("nope".to_string())));

        let blank = HashMap::from([("deepseek-chat".to_string(), "  ".to_string())]);
        let err = dispatcher().prepare("deepseek-chat", &[], &blank).unwrap_err();
        assert_eq!(
            err,
            DispatchError::Gateway(GatewayError::MissingCredential("deepseek-chat".to_string()))
        );
    }
}
