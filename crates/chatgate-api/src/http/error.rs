//! Application error type mapping to HTTP status codes and public messages.
//!
//! Only the category message crosses the API boundary; the underlying
//! store or provider error is logged where it happens.

use axum::http::StatusCode;

use chatgate_core::conversation::service::ConversationError;
use chatgate_core::dispatch::DispatchError;
use chatgate_core::validation::ValidationError;
use chatgate_types::error::{ReferencedEntity, RepositoryError};

pub const DATABASE_NOT_CONFIGURED: &str = "Database is not configured";
pub const PROVIDER_NOT_CONFIGURED: &str = "Requested provider is not configured";
pub const CHAT_FAILED: &str = "Chat request failed";
pub const CONVERSATION_NOT_FOUND: &str = "Conversation not found";
pub const INVALID_JSON_BODY: &str = "Request body must be a valid JSON object";
pub const DATABASE_BUSY: &str = "Database is temporarily unavailable";

/// Application-level error that maps to HTTP responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Malformed, missing or out-of-range input.
    Validation(String),
    /// Target or referenced entity absent.
    NotFound(String),
    /// A dependency (database, provider) is not configured.
    Unavailable(String),
    /// The remote chat call failed.
    Upstream(String),
    /// Store failure or inconsistency.
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Unavailable(msg)
            | AppError::Upstream(msg)
            | AppError::Internal(msg) => msg,
        }
    }

    pub fn database_unavailable() -> Self {
        AppError::Unavailable(DATABASE_NOT_CONFIGURED.to_string())
    }

    /// Map a conversation failure. `storage_message` is the generic message
    /// for the operation, used when a query failed. An exhausted, closed or
    /// unreachable pool is a 503, not a 500.
    pub fn from_conversation(err: ConversationError, storage_message: &str) -> Self {
        match err {
            ConversationError::Validation(e) => e.into(),
            ConversationError::NotFound => AppError::NotFound(CONVERSATION_NOT_FOUND.to_string()),
            ConversationError::MissingReference(entity) => AppError::NotFound(missing_reference_message(entity).to_string()),
            ConversationError::Inconsistent(msg) => AppError::Internal(msg),
            ConversationError::Storage(RepositoryError::Unavailable(_) | RepositoryError::Connection(_)) => {
                AppError::Unavailable(DATABASE_BUSY.to_string())
            }
            ConversationError::Storage(_) => AppError::Internal(storage_message.to_string()),
        }
    }
}

fn missing_reference_message(entity: ReferencedEntity) -> &'static str {
    match entity {
        ReferencedEntity::Agent => "Agent does not exist",
        ReferencedEntity::Creator => "User does not exist",
        ReferencedEntity::Unknown => "Related record does not exist",
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e.0)
    }
}

impl From<DispatchError> for AppError {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::Validation(e) => e.into(),
            DispatchError::ProviderUnavailable { .. } => {
                AppError::Unavailable(PROVIDER_NOT_CONFIGURED.to_string())
            }
            DispatchError::Upstream(_) => AppError::Upstream(CHAT_FAILED.to_string()),
        }
    }
}
