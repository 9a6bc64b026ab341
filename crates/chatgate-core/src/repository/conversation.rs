//! Conversation repository trait definition.

use chatgate_types::conversation::{Conversation, NewConversation};
use chatgate_types::error::RepositoryError;

/// Repository trait for conversation persistence.
///
/// Implementations live in chatgate-infra (e.g., `MySqlConversationRepository`).
/// Referential-integrity failures on insert must surface as
/// [`RepositoryError::ForeignKey`] so the service can report them distinctly.
pub trait ConversationRepository: Send + Sync {
    /// Insert a conversation. Returns the store-assigned id, or `0` when the
    /// store did not report one.
    fn insert(
        &self,
        conversation: &NewConversation,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Get a conversation by id.
    fn find_by_id(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<Conversation>, RepositoryError>> + Send;

    /// List conversations created by `creator_id`, newest first.
    fn list_by_creator(
        &self,
        creator_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<Conversation>, RepositoryError>> + Send;

    /// Delete a conversation. Returns the number of rows removed.
    fn delete(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
