//! Conversation records persisted by the gateway.
//!
//! A conversation belongs to one creator (user) and one agent. Both are
//! foreign keys into tables owned by other services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of a conversation title, in characters.
pub const MAX_TITLE_LEN: usize = 255;

/// A conversation row as returned by the store.
///
/// Serialized in camelCase for the HTTP surface; the creator is exposed as
/// `userId` to match the request field that set it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: i64,
    #[serde(rename = "userId")]
    pub creator_id: i64,
    pub agent_id: i64,
    pub title: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Validated input for inserting a conversation.
///
/// `title` is already trimmed (and `None` when blank); `metadata` is a JSON
/// object or `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewConversation {
    pub creator_id: i64,
    pub agent_id: i64,
    pub title: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl NewConversation {
    /// Serialize the metadata for the JSON column.
    pub fn metadata_json(&self) -> Result<Option<String>, serde_json::Error> {
        self.metadata.as_ref().map(serde_json::to_string).transpose()
    }
}

/// Result of a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedConversation {
    pub id: i64,
    pub deleted: bool,
}
