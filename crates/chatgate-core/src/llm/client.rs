//! ChatClient trait definition.
//!
//! This is the core abstraction that every chat backend implements. Uses
//! RPITIT for `chat`; [`super::box_client::BoxChatClient`] provides the
//! object-safe form stored in the registry.

use chatgate_types::llm::{ChatReply, ChatRequest, LlmError};

/// Trait for chat provider backends (OpenAI, DeepSeek, ...).
///
/// Implementations live in chatgate-infra (e.g., `OpenAiCompatibleClient`).
pub trait ChatClient: Send + Sync {
    /// Registry key of this provider (e.g., "gpt", "deepseek").
    fn name(&self) -> &str;

    /// Built-in model used when neither the request nor the configuration
    /// names one.
    fn default_model(&self) -> &str;

    /// Send the conversation and return the provider's reply.
    fn chat(
        &self,
        request: &ChatRequest,
    ) -> impl std::future::Future<Output = Result<ChatReply, LlmError>> + Send;
}
