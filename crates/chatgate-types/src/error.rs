use std::fmt;

use thiserror::Error;

/// The related row a foreign-key violation pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferencedEntity {
    /// `conversation.agent_id` -> `agent.id`
    Agent,
    /// `conversation.creator_id` -> the user table
    Creator,
    /// The store did not say which key failed.
    Unknown,
}

impl fmt::Display for ReferencedEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferencedEntity::Agent => write!(f, "agent"),
            ReferencedEntity::Creator => write!(f, "user"),
            ReferencedEntity::Unknown => write!(f, "related record"),
        }
    }
}

/// Errors from repository operations (used by trait definitions in chatgate-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error: {0}")]
    Connection(String),

    #[error("database pool unavailable: {0}")]
    Unavailable(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("foreign key violation on {0}")]
    ForeignKey(ReferencedEntity),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_foreign_key_display_names_entity() {
        let err = RepositoryError::ForeignKey(ReferencedEntity::Agent);
        assert_eq!(err.to_string(), "foreign key violation on agent");
        assert_eq!(ReferencedEntity::Creator.to_string(), "user");
    }
}
