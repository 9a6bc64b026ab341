//! Chat dispatch: validate, resolve a provider and model, invoke the client.
//!
//! The dispatcher never persists the exchange. Upstream failures are logged
//! with full detail here and surface to callers only as
//! [`DispatchError::Upstream`].

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::Instrument;

use chatgate_types::llm::{ChatMessage, ChatReply, ChatRequest, DEFAULT_TEMPERATURE, LlmError};

use crate::llm::registry::ProviderRegistry;
use crate::validation::{self, ValidationError};

/// Errors from [`ChatDispatcher::dispatch`].
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// No client is registered for the resolved provider name.
    #[error("provider '{provider}' is not configured")]
    ProviderUnavailable { provider: String },

    #[error("upstream chat failed: {0}")]
    Upstream(#[source] LlmError),
}

/// Body of a chat request, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchInput {
    pub conversation_id: Option<Value>,
    pub user_id: Option<Value>,
    pub agent_id: Option<Value>,
    pub messages: Option<Value>,
    pub provider: Option<Value>,
    pub model: Option<Value>,
    pub temperature: Option<Value>,
    pub max_tokens: Option<Value>,
}

/// A validated chat request that still needs provider resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedChat {
    pub conversation_id: i64,
    pub user_id: i64,
    pub agent_id: i64,
    pub messages: Vec<ChatMessage>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub temperature: f64,
    pub max_tokens: Option<u32>,
}

impl DispatchInput {
    /// Validate in order: ids, messages, provider, model, temperature,
    /// maxTokens. First failure wins.
    pub fn validate(&self) -> Result<ValidatedChat, ValidationError> {
        let conversation_id = validation::positive_id("conversationId", self.conversation_id.as_ref())?;
        let user_id = validation::positive_id("userId", self.user_id.as_ref())?;
        let agent_id = validation::positive_id("agentId", self.agent_id.as_ref())?;
        let messages = validation::chat_messages(self.messages.as_ref())?;
        let provider = validation::optional_name("provider", self.provider.as_ref())?;
        let model = validation::optional_name("model", self.model.as_ref())?;
        let temperature = validation::optional_temperature(self.temperature.as_ref())?;
        let max_tokens = validation::optional_max_tokens(self.max_tokens.as_ref())?;

        Ok(ValidatedChat {
            conversation_id,
            user_id,
            agent_id,
            messages,
            provider,
            model,
            temperature: temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens,
        })
    }
}

/// Routes validated chat requests to the registered provider clients.
pub struct ChatDispatcher {
    registry: ProviderRegistry,
}

impl ChatDispatcher {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Validate `input`, then send it to the resolved provider.
    pub async fn dispatch(&self, input: &DispatchInput) -> Result<ChatReply, DispatchError> {
        let chat = input.validate()?;
        self.send(chat).await
    }

    /// Send an already validated request.
    pub async fn send(&self, chat: ValidatedChat) -> Result<ChatReply, DispatchError> {
        let provider = self.registry.resolve_name(chat.provider.as_deref()).to_string();
        let Some(client) = self.registry.get(&provider) else {
            tracing::warn!(provider = %provider, "Requested provider is not configured");
            return Err(DispatchError::ProviderUnavailable { provider });
        };

        let model = self
            .registry
            .resolve_model(&provider, client, chat.model.as_deref());
        let request = ChatRequest {
            model,
            messages: chat.messages,
            temperature: Some(chat.temperature),
            max_tokens: chat.max_tokens,
        };

        let span = tracing::info_span!(
            "gen_ai.chat",
            gen_ai.system = %provider,
            gen_ai.request.model = %request.model,
            gen_ai.request.temperature = chat.temperature,
            gen_ai.request.max_tokens = ?chat.max_tokens,
            conversation_id = chat.conversation_id,
            user_id = chat.user_id,
            agent_id = chat.agent_id,
        );

        async {
            match client.chat(&request).await {
                Ok(reply) => {
                    tracing::debug!(content_len = reply.content.len(), "Chat completed");
                    Ok(reply)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Upstream chat failed");
                    Err(DispatchError::Upstream(e))
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::box_client::BoxChatClient;
    use crate::llm::client::ChatClient;
    use chatgate_types::config::ProviderSettings;
    use chatgate_types::llm::MessageRole;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    // --- Mock client ---

    struct RecordingClient {
        name: &'static str,
        model: &'static str,
        fail: bool,
        seen: Arc<Mutex<Vec<ChatRequest>>>,
    }

    impl ChatClient for RecordingClient {
        fn name(&self) -> &str {
            self.name
        }

        fn default_model(&self) -> &str {
            self.model
        }

        async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, LlmError> {
            self.seen.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(LlmError::Provider {
                    message: "connection reset".to_string(),
                });
            }
            Ok(ChatReply {
                role: MessageRole::Assistant,
                content: format!("{} says hello", self.name),
            })
        }
    }

    struct Fixture {
        dispatcher: ChatDispatcher,
        gpt_calls: Arc<Mutex<Vec<ChatRequest>>>,
        deepseek_calls: Arc<Mutex<Vec<ChatRequest>>>,
    }

    fn fixture(deepseek_fails: bool) -> Fixture {
        let gpt_calls = Arc::new(Mutex::new(Vec::new()));
        let deepseek_calls = Arc::new(Mutex::new(Vec::new()));

        let mut settings = ProviderSettings::default();
        settings
            .default_models
            .insert("deepseek".to_string(), "deepseek-reasoner".to_string());

        let mut registry = ProviderRegistry::new(settings);
        registry.register(
            "gpt",
            BoxChatClient::new(RecordingClient {
                name: "gpt",
                model: "gpt-4o-mini",
                fail: false,
                seen: gpt_calls.clone(),
            }),
        );
        registry.register(
            "deepseek",
            BoxChatClient::new(RecordingClient {
                name: "deepseek",
                model: "deepseek-chat",
                fail: deepseek_fails,
                seen: deepseek_calls.clone(),
            }),
        );

        Fixture {
            dispatcher: ChatDispatcher::new(registry),
            gpt_calls,
            deepseek_calls,
        }
    }

    fn input(extra: Value) -> DispatchInput {
        let mut body = json!({
            "conversationId": 1,
            "userId": 7,
            "agentId": 1,
            "messages": [{"role": "user", "content": "hi"}]
        });
        if let (Value::Object(base), Value::Object(extra)) = (&mut body, extra) {
            base.extend(extra);
        }
        serde_json::from_value(body).unwrap()
    }

    #[tokio::test]
    async fn test_default_provider_and_builtin_model() {
        let f = fixture(false);
        let reply = f.dispatcher.dispatch(&input(json!({}))).await.unwrap();
        assert_eq!(reply.role, MessageRole::Assistant);
        assert_eq!(reply.content, "gpt says hello");

        let calls = f.gpt_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model, "gpt-4o-mini");
        assert_eq!(calls[0].temperature, Some(DEFAULT_TEMPERATURE));
        assert_eq!(calls[0].messages, vec![ChatMessage::new(MessageRole::User, "hi")]);
    }

    #[tokio::test]
    async fn test_named_provider_uses_configured_default_model() {
        let f = fixture(false);
        f.dispatcher
            .dispatch(&input(json!({"provider": "deepseek", "maxTokens": 64})))
            .await
            .unwrap();

        let calls = f.deepseek_calls.lock().unwrap();
        assert_eq!(calls[0].model, "deepseek-reasoner");
        assert_eq!(calls[0].max_tokens, Some(64));
        assert!(f.gpt_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_explicit_model_wins() {
        let f = fixture(false);
        f.dispatcher
            .dispatch(&input(json!({"provider": "deepseek", "model": "deepseek-coder", "temperature": 0.2})))
            .await
            .unwrap();

        let calls = f.deepseek_calls.lock().unwrap();
        assert_eq!(calls[0].model, "deepseek-coder");
        assert_eq!(calls[0].temperature, Some(0.2));
    }

    #[tokio::test]
    async fn test_unknown_provider_is_unavailable_and_never_invoked() {
        let f = fixture(false);
        let err = f
            .dispatcher
            .dispatch(&input(json!({"provider": "unknown"})))
            .await
            .unwrap_err();
        match err {
            DispatchError::ProviderUnavailable { provider } => assert_eq!(provider, "unknown"),
            other => panic!("expected ProviderUnavailable, got {other:?}"),
        }
        assert!(f.gpt_calls.lock().unwrap().is_empty());
        assert!(f.deepseek_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_failure_is_wrapped() {
        let f = fixture(true);
        let err = f
            .dispatcher
            .dispatch(&input(json!({"provider": "deepseek"})))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Upstream(LlmError::Provider { .. })));
    }

    #[tokio::test]
    async fn test_validation_runs_before_resolution() {
        let f = fixture(false);
        let err = f
            .dispatcher
            .dispatch(&input(json!({"userId": 0, "provider": "unknown"})))
            .await
            .unwrap_err();
        match err {
            DispatchError::Validation(e) => assert_eq!(e.to_string(), "userId must be a positive integer"),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_order_and_defaults() {
        let missing_all = DispatchInput::default();
        assert_eq!(
            missing_all.validate().unwrap_err().to_string(),
            "conversationId is required"
        );

        let bad_messages = input(json!({"messages": [], "temperature": 5}));
        assert_eq!(
            bad_messages.validate().unwrap_err().to_string(),
            "messages must be a non-empty array"
        );

        let bad_temperature = input(json!({"temperature": 5, "maxTokens": 0}));
        assert!(bad_temperature.validate().unwrap_err().to_string().starts_with("temperature"));

        let bad_provider = input(json!({"provider": 5, "temperature": 9}));
        assert_eq!(
            bad_provider.validate().unwrap_err().to_string(),
            "provider must be a string"
        );

        let bad_model = input(json!({"model": {"name": "gpt-4o"}}));
        assert_eq!(bad_model.validate().unwrap_err().to_string(), "model must be a string");

        let ok = input(json!({"provider": "  ", "model": ""})).validate().unwrap();
        assert_eq!(ok.provider, None);
        assert_eq!(ok.model, None);
        assert_eq!(ok.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(ok.max_tokens, None);
    }
}
