//! Application state wiring all services together.
//!
//! `AppState` is generic over the conversation repository so the router can
//! be exercised with an in-memory store; [`ServerState`] pins it to MySQL.

use std::sync::Arc;

use chatgate_core::conversation::service::ConversationService;
use chatgate_core::dispatch::ChatDispatcher;
use chatgate_core::repository::conversation::ConversationRepository;
use chatgate_infra::config::GatewayConfig;
use chatgate_infra::llm::build_registry;
use chatgate_infra::mysql::conversation::MySqlConversationRepository;
use chatgate_infra::mysql::pool::DatabasePool;

use crate::http::error::AppError;
use crate::http::response::Responder;

/// State used by the running server.
pub type ServerState = AppState<MySqlConversationRepository>;

/// Shared application state handed to every handler.
pub struct AppState<R: ConversationRepository> {
    /// `None` when the database is not configured.
    pub conversations: Option<Arc<ConversationService<R>>>,
    pub dispatcher: Arc<ChatDispatcher>,
    pub responder: Responder,
}

// Manual impl: `R` itself need not be `Clone`.
impl<R: ConversationRepository> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            conversations: self.conversations.clone(),
            dispatcher: self.dispatcher.clone(),
            responder: self.responder,
        }
    }
}

impl<R: ConversationRepository> AppState<R> {
    pub fn new(conversations: Option<ConversationService<R>>, dispatcher: ChatDispatcher, responder: Responder) -> Self {
        Self {
            conversations: conversations.map(Arc::new),
            dispatcher: Arc::new(dispatcher),
            responder,
        }
    }

    /// The conversation service, or 503 "Database is not configured".
    pub fn conversations(&self) -> Result<&ConversationService<R>, AppError> {
        self.conversations
            .as_deref()
            .ok_or_else(AppError::database_unavailable)
    }

    pub fn database_configured(&self) -> bool {
        self.conversations.is_some()
    }
}

impl ServerState {
    /// Wire services from configuration and the (optional) database pool.
    pub fn from_config(config: &GatewayConfig, pool: Option<DatabasePool>) -> Self {
        let conversations = pool.map(|pool| ConversationService::new(MySqlConversationRepository::new(pool)));
        let registry = build_registry(config.providers.clone(), config.provider_settings.clone());

        Self::new(
            conversations,
            ChatDispatcher::new(registry),
            Responder::new(config.envelope),
        )
    }
}
