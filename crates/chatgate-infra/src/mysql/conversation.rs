//! MySQL conversation repository implementation.
//!
//! Implements `ConversationRepository` from `chatgate-core` on top of the
//! gated [`DatabasePool`].

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta, Utc};
use serde_json::Value;
use sqlx::Row;
use sqlx::mysql::MySqlRow;

use chatgate_core::repository::conversation::ConversationRepository;
use chatgate_types::conversation::{Conversation, NewConversation};
use chatgate_types::error::RepositoryError;

use super::errors::map_pool_error;
use super::pool::{DatabasePool, SqlParam};

const INSERT_SQL: &str =
    "INSERT INTO conversation (creator_id, agent_id, title, metadata) VALUES (?, ?, ?, ?)";

const SELECT_BY_ID_SQL: &str = "SELECT id, creator_id, agent_id, title, CAST(metadata AS CHAR) AS metadata, \
     created_at, updated_at FROM conversation WHERE id = ? LIMIT 1";

const SELECT_BY_CREATOR_SQL: &str = "SELECT id, creator_id, agent_id, title, CAST(metadata AS CHAR) AS metadata, \
     created_at, updated_at FROM conversation WHERE creator_id = ? ORDER BY created_at DESC, id DESC";

const DELETE_SQL: &str = "DELETE FROM conversation WHERE id = ?";

/// MySQL-backed implementation of `ConversationRepository`.
#[derive(Clone)]
pub struct MySqlConversationRepository {
    pool: DatabasePool,
}

impl MySqlConversationRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping MySQL rows to the domain `Conversation`.
struct ConversationRow {
    id: i64,
    creator_id: i64,
    agent_id: i64,
    title: Option<String>,
    metadata: Option<String>,
    created_at: Option<NaiveDateTime>,
    updated_at: Option<NaiveDateTime>,
}

impl ConversationRow {
    fn from_row(row: &MySqlRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: get_id(row, "id")?,
            creator_id: get_id(row, "creator_id")?,
            agent_id: get_id(row, "agent_id")?,
            title: row.try_get("title")?,
            metadata: row.try_get("metadata")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// `offset` is the zone the server rendered the timestamps in.
    fn into_conversation(self, offset: FixedOffset) -> Conversation {
        Conversation {
            id: self.id,
            creator_id: self.creator_id,
            agent_id: self.agent_id,
            title: self.title,
            metadata: self.metadata.as_deref().map(decode_json_column),
            created_at: self.created_at.map(|dt| to_utc(dt, offset)),
            updated_at: self.updated_at.map(|dt| to_utc(dt, offset)),
        }
    }
}

fn to_utc(local: NaiveDateTime, offset: FixedOffset) -> DateTime<Utc> {
    (local - TimeDelta::seconds(i64::from(offset.local_minus_utc()))).and_utc()
}

/// Id columns may be declared signed or unsigned.
fn get_id(row: &MySqlRow, column: &str) -> Result<i64, sqlx::Error> {
    match row.try_get::<i64, _>(column) {
        Ok(id) => Ok(id),
        Err(sqlx::Error::ColumnDecode { .. }) => {
            let id: u64 = row.try_get(column)?;
            i64::try_from(id).map_err(|e| sqlx::Error::ColumnDecode {
                index: column.to_string(),
                source: Box::new(e),
            })
        }
        Err(e) => Err(e),
    }
}

/// Decode a JSON column. Text that is not valid JSON is returned as a JSON
/// string rather than failing the read.
pub fn decode_json_column(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn decode_rows(rows: &[MySqlRow], offset: FixedOffset) -> Result<Vec<Conversation>, RepositoryError> {
    rows.iter()
        .map(|row| {
            ConversationRow::from_row(row)
                .map(|row| row.into_conversation(offset))
                .map_err(|e| RepositoryError::Query(format!("invalid conversation row: {e}")))
        })
        .collect()
}

impl ConversationRepository for MySqlConversationRepository {
    async fn insert(&self, conversation: &NewConversation) -> Result<u64, RepositoryError> {
        let metadata = conversation
            .metadata_json()
            .map_err(|e| RepositoryError::Query(format!("failed to encode metadata: {e}")))?;

        let params = [
            SqlParam::Int(conversation.creator_id),
            SqlParam::Int(conversation.agent_id),
            SqlParam::from(conversation.title.clone()),
            SqlParam::from(metadata),
        ];
        let result = self
            .pool
            .execute(INSERT_SQL, &params)
            .await
            .map_err(map_pool_error)?;

        Ok(result.last_insert_id())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Conversation>, RepositoryError> {
        let rows = self
            .pool
            .fetch_all(SELECT_BY_ID_SQL, &[SqlParam::Int(id)])
            .await
            .map_err(map_pool_error)?;

        Ok(decode_rows(&rows, self.pool.utc_offset())?.into_iter().next())
    }

    async fn list_by_creator(&self, creator_id: i64) -> Result<Vec<Conversation>, RepositoryError> {
        let rows = self
            .pool
            .fetch_all(SELECT_BY_CREATOR_SQL, &[SqlParam::Int(creator_id)])
            .await
            .map_err(map_pool_error)?;

        decode_rows(&rows, self.pool.utc_offset())
    }

    async fn delete(&self, id: i64) -> Result<u64, RepositoryError> {
        let result = self
            .pool
            .execute(DELETE_SQL, &[SqlParam::Int(id)])
            .await
            .map_err(map_pool_error)?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Offset};
    use serde_json::json;

    #[test]
    fn test_decode_json_column_object_keeps_key_order() {
        let value = decode_json_column(r#"{"lang":"en","tags":["a","b"],"depth":2}"#);
        assert_eq!(value, json!({"lang": "en", "tags": ["a", "b"], "depth": 2}));
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["lang", "tags", "depth"]);
    }

    #[test]
    fn test_decode_json_column_tolerates_invalid_json() {
        assert_eq!(decode_json_column("not json {"), json!("not json {"));
        assert_eq!(decode_json_column(""), json!(""));
    }

    #[test]
    fn test_row_into_conversation() {
        let created = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        let row = ConversationRow {
            id: 4,
            creator_id: 7,
            agent_id: 1,
            title: Some("Trip Plan".to_string()),
            metadata: Some(r#"{"lang":"en"}"#.to_string()),
            created_at: Some(created),
            updated_at: None,
        };

        let conversation = row.into_conversation(Utc.fix());
        assert_eq!(conversation.id, 4);
        assert_eq!(conversation.metadata, Some(json!({"lang": "en"})));
        assert_eq!(
            conversation.created_at.unwrap().to_rfc3339(),
            "2024-05-01T12:30:00+00:00"
        );
        assert!(conversation.updated_at.is_none());
    }

    #[test]
    fn test_row_timestamps_honour_session_offset() {
        // Stored at 04:00Z, rendered by a +08:00 session as 12:00.
        let rendered = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let row = ConversationRow {
            id: 5,
            creator_id: 7,
            agent_id: 1,
            title: None,
            metadata: None,
            created_at: Some(rendered),
            updated_at: Some(rendered),
        };

        let offset = FixedOffset::east_opt(8 * 3600).unwrap();
        let conversation = row.into_conversation(offset);
        assert_eq!(
            conversation.created_at.unwrap().to_rfc3339(),
            "2024-05-01T04:00:00+00:00"
        );
        assert_eq!(conversation.updated_at, conversation.created_at);

        let west = FixedOffset::west_opt(5 * 3600 + 30 * 60).unwrap();
        assert_eq!(to_utc(rendered, west).to_rfc3339(), "2024-05-01T17:30:00+00:00");
    }

    #[test]
    fn test_list_query_orders_newest_first() {
        assert!(SELECT_BY_CREATOR_SQL.contains("WHERE creator_id = ?"));
        assert!(SELECT_BY_CREATOR_SQL.contains("ORDER BY created_at DESC"));
    }
}
