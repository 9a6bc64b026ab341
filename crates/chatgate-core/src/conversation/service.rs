//! Conversation service.
//!
//! Wraps a [`ConversationRepository`] with the create/list/detail/delete
//! contract: canonical re-read after insert, not-found detection on delete,
//! and translation of referential-integrity failures into a distinct error.

use thiserror::Error;

use chatgate_types::conversation::{Conversation, DeletedConversation, NewConversation};
use chatgate_types::error::{ReferencedEntity, RepositoryError};

use crate::repository::conversation::ConversationRepository;
use crate::validation::ValidationError;

/// Errors from conversation operations.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("conversation not found")]
    NotFound,

    #[error("{0} does not exist")]
    MissingReference(ReferencedEntity),

    #[error("inconsistent store state: {0}")]
    Inconsistent(String),

    #[error("storage error: {0}")]
    Storage(#[source] RepositoryError),
}

/// Service orchestrating the conversation lifecycle.
///
/// Generic over the repository to keep chatgate-core free of database crates.
pub struct ConversationService<R: ConversationRepository> {
    repo: R,
}

impl<R: ConversationRepository> ConversationService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Access the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Insert a conversation and return the canonical stored row.
    ///
    /// The row is re-read by id so server-assigned timestamps are included.
    /// A missing id or a missing row after insert is an internal
    /// inconsistency and is not retried.
    pub async fn create(&self, conversation: NewConversation) -> Result<Conversation, ConversationError> {
        conversation.metadata_json().map_err(|e| {
            ConversationError::Validation(ValidationError(format!(
                "metadata must be serializable to JSON: {e}"
            )))
        })?;

        let id = self.repo.insert(&conversation).await.map_err(|e| match e {
            RepositoryError::ForeignKey(entity) => {
                tracing::warn!(
                    creator_id = conversation.creator_id,
                    agent_id = conversation.agent_id,
                    entity = %entity,
                    "Conversation insert rejected by foreign key"
                );
                ConversationError::MissingReference(entity)
            }
            other => storage_failure("create", other),
        })?;

        let id = i64::try_from(id)
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| {
                tracing::error!("Insert did not report a conversation id");
                ConversationError::Inconsistent("Failed to determine created conversation id".to_string())
            })?;

        let created = self
            .repo
            .find_by_id(id)
            .await
            .map_err(|e| storage_failure("create", e))?
            .ok_or_else(|| {
                tracing::error!(conversation_id = id, "Created conversation could not be re-read");
                ConversationError::Inconsistent("Failed to load created conversation".to_string())
            })?;

        tracing::info!(
            conversation_id = created.id,
            creator_id = created.creator_id,
            agent_id = created.agent_id,
            "Created conversation"
        );
        Ok(created)
    }

    /// List a user's conversations, newest first. Empty when none exist.
    pub async fn list(&self, user_id: i64) -> Result<Vec<Conversation>, ConversationError> {
        self.repo
            .list_by_creator(user_id)
            .await
            .map_err(|e| storage_failure("list", e))
    }

    /// Get a single conversation.
    pub async fn get(&self, conversation_id: i64) -> Result<Conversation, ConversationError> {
        self.repo
            .find_by_id(conversation_id)
            .await
            .map_err(|e| storage_failure("get", e))?
            .ok_or(ConversationError::NotFound)
    }

    /// Delete a conversation. No matching row is [`ConversationError::NotFound`].
    pub async fn delete(&self, conversation_id: i64) -> Result<DeletedConversation, ConversationError> {
        let affected = self
            .repo
            .delete(conversation_id)
            .await
            .map_err(|e| storage_failure("delete", e))?;

        if affected == 0 {
            return Err(ConversationError::NotFound);
        }

        tracing::info!(conversation_id, "Deleted conversation");
        Ok(DeletedConversation {
            id: conversation_id,
            deleted: true,
        })
    }
}

fn storage_failure(operation: &'static str, error: RepositoryError) -> ConversationError {
    tracing::error!(operation, error = %error, "Conversation store operation failed");
    ConversationError::Storage(error)
}
