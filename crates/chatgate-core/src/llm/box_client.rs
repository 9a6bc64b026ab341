//! BoxChatClient -- object-safe dynamic dispatch wrapper for ChatClient.
//!
//! 1. Define an object-safe `ChatClientDyn` trait with boxed futures
//! 2. Blanket-impl `ChatClientDyn` for all `T: ChatClient`
//! 3. `BoxChatClient` wraps `Box<dyn ChatClientDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use chatgate_types::llm::{ChatReply, ChatRequest, LlmError};

use super::client::ChatClient;

/// Object-safe version of [`ChatClient`] with boxed futures.
pub trait ChatClientDyn: Send + Sync {
    fn name(&self) -> &str;

    fn default_model(&self) -> &str;

    fn chat_boxed<'a>(
        &'a self,
        request: &'a ChatRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ChatReply, LlmError>> + Send + 'a>>;
}

impl<T: ChatClient> ChatClientDyn for T {
    fn name(&self) -> &str {
        ChatClient::name(self)
    }

    fn default_model(&self) -> &str {
        ChatClient::default_model(self)
    }

    fn chat_boxed<'a>(
        &'a self,
        request: &'a ChatRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ChatReply, LlmError>> + Send + 'a>> {
        Box::pin(self.chat(request))
    }
}

/// Type-erased chat client for runtime provider selection.
pub struct BoxChatClient {
    inner: Box<dyn ChatClientDyn + Send + Sync>,
}

impl BoxChatClient {
    /// Wrap a concrete `ChatClient` in a type-erased box.
    pub fn new<T: ChatClient + 'static>(client: T) -> Self {
        Self {
            inner: Box::new(client),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn default_model(&self) -> &str {
        self.inner.default_model()
    }

    /// Send the conversation and return the provider's reply.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, LlmError> {
        self.inner.chat_boxed(request).await
    }
}
