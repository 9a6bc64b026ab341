//! OpenAI-compatible chat client implementation.
//!
//! A single [`OpenAiCompatibleClient`] serves every backend that speaks the
//! OpenAI chat completions protocol (OpenAI, DeepSeek) via configurable base
//! URLs and factory functions.
//!
//! Uses [`async_openai`] for type-safe request/response handling.

pub mod config;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestToolMessage,
    ChatCompletionRequestToolMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
};
use secrecy::ExposeSecret;

use chatgate_core::llm::client::ChatClient;
use chatgate_types::llm::{ChatMessage, ChatReply, ChatRequest, LlmError, MessageRole};

use self::config::OpenAiCompatConfig;

/// Chat client for any OpenAI-compatible API.
///
/// Does NOT derive Debug: the `async_openai::Client` holds the API key.
pub struct OpenAiCompatibleClient {
    client: Client<OpenAIConfig>,
    provider_name: String,
    default_model: String,
}

impl OpenAiCompatibleClient {
    /// Create a client from a configuration.
    pub fn new(config: OpenAiCompatConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.expose_secret())
            .with_api_base(&config.base_url);

        Self {
            client: Client::with_config(openai_config),
            provider_name: config.provider_name,
            default_model: config.default_model,
        }
    }

    /// Build a [`CreateChatCompletionRequest`] from a [`ChatRequest`].
    fn build_request(&self, request: &ChatRequest) -> CreateChatCompletionRequest {
        let messages = request.messages.iter().map(to_openai_message).collect();

        let model = if request.model.is_empty() {
            self.default_model.clone()
        } else {
            request.model.clone()
        };

        // DeepSeek only honours `max_tokens`, not `max_completion_tokens`.
        #[allow(deprecated)]
        let req = CreateChatCompletionRequest {
            model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature.map(|t| t as f32),
            ..Default::default()
        };
        req
    }
}

fn to_openai_message(msg: &ChatMessage) -> ChatCompletionRequestMessage {
    match msg.role {
        MessageRole::System => {
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(msg.content.clone()),
                name: None,
            })
        }
        MessageRole::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(msg.content.clone()),
            name: None,
        }),
        MessageRole::Assistant => {
            #[allow(deprecated)]
            ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                    msg.content.clone(),
                )),
                refusal: None,
                name: None,
                audio: None,
                tool_calls: None,
                function_call: None,
            })
        }
        // Incoming tool messages carry no call id.
        MessageRole::Tool => ChatCompletionRequestMessage::Tool(ChatCompletionRequestToolMessage {
            content: ChatCompletionRequestToolMessageContent::Text(msg.content.clone()),
            tool_call_id: String::new(),
        }),
    }
}

impl ChatClient for OpenAiCompatibleClient {
    fn name(&self) -> &str {
        &self.provider_name
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, LlmError> {
        let oai_request = self.build_request(request);

        let response = self
            .client
            .chat()
            .create(oai_request)
            .await
            .map_err(map_openai_error)?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LlmError::EmptyResponse)?;

        Ok(ChatReply {
            role: MessageRole::Assistant,
            content,
        })
    }
}

/// Map an `async_openai::error::OpenAIError` to an [`LlmError`].
fn map_openai_error(err: async_openai::error::OpenAIError) -> LlmError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "invalid_api_key"
                || error_type == "authentication_error"
                || api_err.message.contains("Incorrect API key")
                || api_err.message.contains("Invalid API key")
            {
                LlmError::AuthenticationFailed
            } else if code == "rate_limit_exceeded" || error_type == "rate_limit_error" {
                LlmError::RateLimited
            } else if error_type == "invalid_request_error" {
                LlmError::InvalidRequest(api_err.message.clone())
            } else {
                LlmError::Provider {
                    message: err.to_string(),
                }
            }
        }
        OpenAIError::Reqwest(reqwest_err) => match reqwest_err.status().map(|s| s.as_u16()) {
            Some(401) => LlmError::AuthenticationFailed,
            Some(429) => LlmError::RateLimited,
            _ => LlmError::Provider {
                message: err.to_string(),
            },
        },
        OpenAIError::JSONDeserialize(_, content) => {
            LlmError::Deserialization(format!("failed to parse response: {content}"))
        }
        OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg.clone()),
        _ => LlmError::Provider {
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    use super::config::{deepseek_defaults, gpt_defaults};

    fn key() -> SecretString {
        SecretString::from("sk-test".to_string())
    }

    #[test]
    fn test_gpt_defaults() {
        let client = OpenAiCompatibleClient::new(gpt_defaults(key()));
        assert_eq!(client.name(), "gpt");
        assert_eq!(client.default_model(), "gpt-4o-mini");
    }

    #[test]
    fn test_deepseek_defaults() {
        let client = OpenAiCompatibleClient::new(deepseek_defaults(key()));
        assert_eq!(client.name(), "deepseek");
        assert_eq!(client.default_model(), "deepseek-chat");
    }

    #[test]
    fn test_build_request_keeps_message_order_and_options() {
        let client = OpenAiCompatibleClient::new(deepseek_defaults(key()));
        let request = ChatRequest {
            model: "deepseek-reasoner".to_string(),
            messages: vec![
                ChatMessage::new(MessageRole::System, "Be brief"),
                ChatMessage::new(MessageRole::User, "Hello"),
                ChatMessage::new(MessageRole::Assistant, "Hi there!"),
                ChatMessage::new(MessageRole::Tool, "{\"ok\":true}"),
            ],
            temperature: Some(0.5),
            max_tokens: Some(256),
        };

        let oai_req = client.build_request(&request);
        assert_eq!(oai_req.model, "deepseek-reasoner");
        assert_eq!(oai_req.messages.len(), 4);
        assert!(matches!(oai_req.messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(oai_req.messages[1], ChatCompletionRequestMessage::User(_)));
        assert!(matches!(oai_req.messages[2], ChatCompletionRequestMessage::Assistant(_)));
        assert!(matches!(oai_req.messages[3], ChatCompletionRequestMessage::Tool(_)));
        assert_eq!(oai_req.temperature, Some(0.5));
        #[allow(deprecated)]
        let max_tokens = oai_req.max_tokens;
        assert_eq!(max_tokens, Some(256));
        assert!(oai_req.stream.is_none());
    }

    #[test]
    fn test_build_request_empty_model_uses_default() {
        let client = OpenAiCompatibleClient::new(gpt_defaults(key()));
        let request = ChatRequest {
            model: String::new(),
            messages: vec![ChatMessage::new(MessageRole::User, "hi")],
            temperature: None,
            max_tokens: None,
        };

        let oai_req = client.build_request(&request);
        assert_eq!(oai_req.model, "gpt-4o-mini");
        assert!(oai_req.temperature.is_none());
    }

    #[test]
    fn test_map_invalid_argument() {
        let err = async_openai::error::OpenAIError::InvalidArgument("bad model".to_string());
        match map_openai_error(err) {
            LlmError::InvalidRequest(msg) => assert_eq!(msg, "bad model"),
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
    }
}
