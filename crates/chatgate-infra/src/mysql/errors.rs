//! Translation of driver errors into [`RepositoryError`].
//!
//! Referential-integrity failures on insert are classified by which foreign
//! key failed. MySQL reports no structured column for error 1452, so the
//! classifier checks the constraint name when the driver has one and
//! otherwise falls back to matching the column named in the server message.
//! The message match is best-effort; each known message shape has a test.

use sqlx::error::{DatabaseError, ErrorKind};
use sqlx::mysql::MySqlDatabaseError;

use chatgate_types::error::{ReferencedEntity, RepositoryError};

use super::pool::PoolError;

/// `ER_NO_REFERENCED_ROW_2`: a child row references a missing parent.
pub const ER_NO_REFERENCED_ROW_2: u16 = 1452;

/// Map any pool or query failure to a repository error.
pub fn map_pool_error(err: PoolError) -> RepositoryError {
    match err {
        PoolError::Query(e) => map_sqlx_error(e),
        PoolError::Connect(e) => RepositoryError::Connection(e.to_string()),
        other @ (PoolError::Exhausted
        | PoolError::QueueFull(_)
        | PoolError::Closed
        | PoolError::DrainTimeout(_)) => RepositoryError::Unavailable(other.to_string()),
    }
}

/// Map a driver error, recognising foreign-key violations.
pub fn map_sqlx_error(err: sqlx::Error) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db_err) if is_missing_parent(&**db_err) => {
            RepositoryError::ForeignKey(classify_foreign_key(&**db_err))
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            RepositoryError::Unavailable(err.to_string())
        }
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) => RepositoryError::Connection(err.to_string()),
        _ => RepositoryError::Query(err.to_string()),
    }
}

fn is_missing_parent(db_err: &dyn DatabaseError) -> bool {
    match db_err.try_downcast_ref::<MySqlDatabaseError>() {
        Some(mysql_err) => mysql_err.number() == ER_NO_REFERENCED_ROW_2,
        None => matches!(db_err.kind(), ErrorKind::ForeignKeyViolation),
    }
}

/// Decide which referenced entity is missing.
pub fn classify_foreign_key(db_err: &dyn DatabaseError) -> ReferencedEntity {
    if let Some(entity) = db_err.constraint().and_then(entity_from_text) {
        return entity;
    }
    referenced_entity_from_message(db_err.message())
}

/// Best-effort classification from the server's message text.
pub fn referenced_entity_from_message(message: &str) -> ReferencedEntity {
    entity_from_text(message).unwrap_or(ReferencedEntity::Unknown)
}

fn entity_from_text(text: &str) -> Option<ReferencedEntity> {
    if text.contains("agent_id") {
        Some(ReferencedEntity::Agent)
    } else if text.contains("creator_id") {
        Some(ReferencedEntity::Creator)
    } else {
        None
    }
}
